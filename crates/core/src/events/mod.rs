//! Event taxonomy
//!
//! Every occurrence the core observes is one case of [`Event`], tagged by an
//! [`EventKind`]. Bracketing kinds (ticks) are posted twice, once per
//! [`EventPhase`]; all other kinds are instantaneous.
//!
//! # Architecture
//!
//! ```text
//! host method → producer (lucid-client) → Event → EventBus::post → subscribers
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lucid_core::bus::{priority, EventBus};
//! use lucid_core::events::{EventPhase, Subscribe};
//!
//! let bus = EventBus::new();
//!
//! bus.on_tick(priority::NORMAL, Some(EventPhase::Pre), |tick, _info| {
//!     tracing::trace!("tick {}", tick.phase);
//!     Ok(())
//! })?;
//!
//! bus.on_receive_packet(priority::EARLY, |event, info| {
//!     if event.packet.id() == 0x40 {
//!         info.cancel();
//!     }
//!     Ok(())
//! })?;
//! ```

mod kind;
pub mod typed;
mod types;

pub use kind::{EventKind, EventPhase};
pub use typed::Subscribe;
pub use types::{
    EntityJoinEvent, EntityLeaveEvent, Event, EventCallback, EventInfo, HandlerError,
    HandlerResult, ReceivePacketEvent, TickEvent, WorldLoadEvent, WorldUnloadEvent,
};
