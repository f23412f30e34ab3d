//! Lucid - Core Logic
//!
//! Typed event dispatch for a game client: an [`EventBus`] that producers
//! post [`Event`]s to, modules that subscribe to them, and a
//! [`TaskScheduler`] that moves work onto the tick thread.
//!
//! # Re-exports
//!
//! - [`sdk`] - host-facing game types carried by event payloads
//! - [`event_handler`] - attribute macro generating typed registration functions

// Allow the crate to refer to itself as `lucid_core` for proc macro compatibility
extern crate self as lucid_core;

pub use lucid_sdk as sdk;

pub mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod module;
pub mod tasks;

pub use bus::{
    priority, BusStats, DispatchFailure, EventBus, FailureCause, PostResult, SubscriptionKey,
};
pub use config::{BusConfig, ConfigError, ConfigResult, CoreConfig, ModuleConfig, TaskConfig};
pub use context::{LifecycleState, Lucid};
pub use error::{LucidError, RegistrationError};
pub use events::{
    EntityJoinEvent, EntityLeaveEvent, Event, EventInfo, EventKind, EventPhase, HandlerError,
    HandlerResult, ReceivePacketEvent, Subscribe, TickEvent, WorldLoadEvent, WorldUnloadEvent,
};
pub use module::{Module, Registrar};
pub use tasks::{TaskError, TaskScheduler};

// Re-export macros
pub use lucid_macros::event_handler;
