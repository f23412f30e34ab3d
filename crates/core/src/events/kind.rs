//! Event kinds and phases

use std::fmt;

/// Discriminator for every event the bus can carry
///
/// The set is closed: adding a variant forces every `match` on it to be
/// revisited, and the registry sizes its tables from [`EventKind::COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Per-frame simulation step, posted as PRE and POST
    Tick = 0,
    /// A world became active
    WorldLoad = 1,
    /// The active world was dropped
    WorldUnload = 2,
    /// An inbound packet finished decoding (network thread)
    ReceivePacket = 3,
    /// An entity was registered with the world
    EntityJoin = 4,
    /// An entity was removed from the world
    EntityLeave = 5,
}

impl EventKind {
    /// Number of event kinds
    pub const COUNT: usize = 6;

    /// Every event kind, in discriminant order
    pub const ALL: [EventKind; Self::COUNT] = [
        Self::Tick,
        Self::WorldLoad,
        Self::WorldUnload,
        Self::ReceivePacket,
        Self::EntityJoin,
        Self::EntityLeave,
    ];

    /// Table index for this kind
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable name used in logs and as the `event` argument of `#[event_handler]`
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::WorldLoad => "world_load",
            Self::WorldUnload => "world_unload",
            Self::ReceivePacket => "receive_packet",
            Self::EntityJoin => "entity_join",
            Self::EntityLeave => "entity_leave",
        }
    }

    /// Whether this kind brackets a duration and is posted once per phase
    pub const fn is_bracketing(self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Whether subscribers may cancel this kind
    ///
    /// Only packet receipt is cancellable: a cancelled packet is not handed
    /// to the host's own packet handling.
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::ReceivePacket)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle phase of a bracketing event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventPhase {
    /// Before the host operation runs
    Pre,
    /// After the host operation completed (or failed)
    Post,
}

impl EventPhase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }

    /// Does a subscription with `filter` accept an event in `phase`?
    ///
    /// No filter accepts everything; a filter never matches a phaseless event.
    #[inline]
    pub fn matches(filter: Option<EventPhase>, phase: Option<EventPhase>) -> bool {
        match filter {
            None => true,
            Some(wanted) => phase == Some(wanted),
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_indexed_in_order() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_capabilities() {
        assert!(EventKind::Tick.is_bracketing());
        assert!(!EventKind::WorldLoad.is_bracketing());
        assert!(EventKind::ReceivePacket.is_cancellable());
        assert!(!EventKind::Tick.is_cancellable());
    }

    #[test]
    fn test_phase_filter() {
        assert!(EventPhase::matches(None, Some(EventPhase::Pre)));
        assert!(EventPhase::matches(None, None));
        assert!(EventPhase::matches(Some(EventPhase::Pre), Some(EventPhase::Pre)));
        assert!(!EventPhase::matches(Some(EventPhase::Pre), Some(EventPhase::Post)));
        assert!(!EventPhase::matches(Some(EventPhase::Post), None));
    }
}
