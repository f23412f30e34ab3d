//! Event system types

use lucid_sdk::{Entity, Packet, World};

use super::kind::{EventKind, EventPhase};

/// Error type returned by a failing subscriber
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by every subscriber callback
pub type HandlerResult = Result<(), HandlerError>;

/// Type alias for untyped subscriber callbacks
///
/// # Arguments
/// * `event` - The posted event, borrowed for the duration of the dispatch
/// * `info` - Mutable dispatch state shared by all subscribers of this post
pub type EventCallback = Box<dyn Fn(&Event<'_>, &mut EventInfo) -> HandlerResult + Send + Sync>;

/// Simulation tick boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEvent {
    pub phase: EventPhase,
}

/// A world was loaded
#[derive(Debug, Clone, Copy)]
pub struct WorldLoadEvent<'a> {
    pub world: &'a World,
}

/// The current world was unloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldUnloadEvent;

/// A packet was received and decoded on the network thread
#[derive(Debug, Clone, Copy)]
pub struct ReceivePacketEvent<'a> {
    pub packet: &'a Packet,
}

/// An entity was added to the world
#[derive(Debug, Clone, Copy)]
pub struct EntityJoinEvent<'a> {
    pub entity: &'a Entity,
}

/// An entity was removed from the world
#[derive(Debug, Clone, Copy)]
pub struct EntityLeaveEvent<'a> {
    pub entity: &'a Entity,
}

/// A single posted occurrence
///
/// Payloads borrow producer-owned host state; an `Event` cannot outlive the
/// call to [`EventBus::post`](crate::bus::EventBus::post) it is passed to.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Tick(TickEvent),
    WorldLoad(WorldLoadEvent<'a>),
    WorldUnload(WorldUnloadEvent),
    ReceivePacket(ReceivePacketEvent<'a>),
    EntityJoin(EntityJoinEvent<'a>),
    EntityLeave(EntityLeaveEvent<'a>),
}

impl<'a> Event<'a> {
    pub fn tick(phase: EventPhase) -> Self {
        Self::Tick(TickEvent { phase })
    }

    pub fn world_load(world: &'a World) -> Self {
        Self::WorldLoad(WorldLoadEvent { world })
    }

    pub fn world_unload() -> Self {
        Self::WorldUnload(WorldUnloadEvent)
    }

    pub fn receive_packet(packet: &'a Packet) -> Self {
        Self::ReceivePacket(ReceivePacketEvent { packet })
    }

    pub fn entity_join(entity: &'a Entity) -> Self {
        Self::EntityJoin(EntityJoinEvent { entity })
    }

    pub fn entity_leave(entity: &'a Entity) -> Self {
        Self::EntityLeave(EntityLeaveEvent { entity })
    }

    /// The discriminator of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Tick(_) => EventKind::Tick,
            Self::WorldLoad(_) => EventKind::WorldLoad,
            Self::WorldUnload(_) => EventKind::WorldUnload,
            Self::ReceivePacket(_) => EventKind::ReceivePacket,
            Self::EntityJoin(_) => EventKind::EntityJoin,
            Self::EntityLeave(_) => EventKind::EntityLeave,
        }
    }

    /// Phase for bracketing events, `None` for instantaneous ones
    pub fn phase(&self) -> Option<EventPhase> {
        match self {
            Self::Tick(tick) => Some(tick.phase),
            _ => None,
        }
    }
}

/// Dispatch state passed to every subscriber alongside the event
///
/// One `EventInfo` lives for one post; changes made by a subscriber are
/// visible to every subscriber after it and to the producer via
/// [`PostResult`](crate::bus::PostResult).
#[derive(Debug, Clone)]
pub struct EventInfo {
    kind: EventKind,
    phase: Option<EventPhase>,
    cancelled: bool,
}

impl EventInfo {
    /// Create dispatch state for an event
    pub fn new(event: &Event<'_>) -> Self {
        Self {
            kind: event.kind(),
            phase: event.phase(),
            cancelled: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn phase(&self) -> Option<EventPhase> {
        self.phase
    }

    pub fn is_cancellable(&self) -> bool {
        self.kind.is_cancellable()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Mark the event cancelled
    ///
    /// Cancellation is sticky for the rest of the dispatch. Returns `false`
    /// and leaves the state untouched when the kind is not cancellable.
    pub fn cancel(&mut self) -> bool {
        if !self.kind.is_cancellable() {
            tracing::debug!("Ignoring cancel() on non-cancellable event '{}'", self.kind);
            return false;
        }
        self.cancelled = true;
        true
    }
}
