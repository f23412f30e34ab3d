//! Decoded inbound packets
//!
//! Only the clientbound packets the observation layer cares about are
//! modelled; everything else arrives as [`Packet::Other`] carrying its id.

/// A fully decoded clientbound packet
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    KeepAlive {
        id: i32,
    },
    TimeUpdate {
        world_time: i64,
        day_time: i64,
    },
    /// Arm swing (0), critical particles (4), enchant particles (5), ...
    Animation {
        entity_id: i32,
        animation: u8,
    },
    EntityVelocity {
        entity_id: i32,
        motion_x: i32,
        motion_y: i32,
        motion_z: i32,
    },
    /// Entity status op code (2 = hurt, 3 = dead, ...)
    EntityStatus {
        entity_id: i32,
        op_code: i8,
    },
    SoundEffect {
        name: String,
        x: f64,
        y: f64,
        z: f64,
    },
    Other {
        id: u8,
    },
}

impl Packet {
    /// Protocol packet id
    pub fn id(&self) -> u8 {
        match self {
            Self::KeepAlive { .. } => 0x00,
            Self::TimeUpdate { .. } => 0x03,
            Self::Animation { .. } => 0x0B,
            Self::EntityVelocity { .. } => 0x12,
            Self::EntityStatus { .. } => 0x1A,
            Self::SoundEffect { .. } => 0x29,
            Self::Other { id } => *id,
        }
    }

    /// Short human-readable name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeepAlive { .. } => "keep_alive",
            Self::TimeUpdate { .. } => "time_update",
            Self::Animation { .. } => "animation",
            Self::EntityVelocity { .. } => "entity_velocity",
            Self::EntityStatus { .. } => "entity_status",
            Self::SoundEffect { .. } => "sound_effect",
            Self::Other { .. } => "other",
        }
    }

    /// Entity id the packet refers to, if any
    pub fn entity_id(&self) -> Option<i32> {
        match self {
            Self::Animation { entity_id, .. }
            | Self::EntityVelocity { entity_id, .. }
            | Self::EntityStatus { entity_id, .. } => Some(*entity_id),
            _ => None,
        }
    }
}
