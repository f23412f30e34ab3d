//! Feature modules
//!
//! A module bundles subscribers that belong together (a tracker, a HUD
//! feature). The [`Lucid`](crate::Lucid) context subscribes modules in
//! insertion order and removes all of their subscriptions on shutdown.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lucid_core::{priority, Module, RegistrationError, Registrar, Subscribe};
//!
//! struct Announcer;
//!
//! impl Module for Announcer {
//!     fn name(&self) -> &'static str {
//!         "announcer"
//!     }
//!
//!     fn subscribe(self: Arc<Self>, registrar: &Registrar<'_>) -> Result<(), RegistrationError> {
//!         registrar.on_world_load(priority::NORMAL, |event, _| {
//!             tracing::info!("Joined {}", event.world.name);
//!             Ok(())
//!         })?;
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::bus::{EventBus, SubscriptionKey};
use crate::context::Lucid;
use crate::error::RegistrationError;
use crate::events::{Event, EventInfo, EventKind, EventPhase, HandlerResult, Subscribe};

/// A named group of subscribers
pub trait Module: Send + Sync + 'static {
    /// Name used in logs, failure reports and config file paths
    fn name(&self) -> &'static str;

    /// Register this module's subscribers
    ///
    /// Receives the module as an `Arc` so callbacks can keep their own
    /// handle to shared module state.
    fn subscribe(self: Arc<Self>, registrar: &Registrar<'_>) -> Result<(), RegistrationError>;

    /// Called once after every module has subscribed
    fn late_initialize(&self, _lucid: &Lucid) {}
}

/// Module-scoped view of the event bus
///
/// Every subscription made through a registrar is tagged with the module
/// name and recorded so the context can remove it later.
pub struct Registrar<'a> {
    bus: &'a EventBus,
    owner: &'static str,
    keys: Mutex<Vec<SubscriptionKey>>,
}

impl<'a> Registrar<'a> {
    pub fn new(bus: &'a EventBus, owner: &'static str) -> Self {
        Self {
            bus,
            owner,
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Keys registered so far
    pub fn keys(&self) -> Vec<SubscriptionKey> {
        self.keys.lock().clone()
    }

    pub fn into_keys(self) -> Vec<SubscriptionKey> {
        self.keys.into_inner()
    }
}

impl Subscribe for Registrar<'_> {
    fn register<F>(
        &self,
        kind: EventKind,
        priority: i32,
        phase: Option<EventPhase>,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&Event<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        let key = self
            .bus
            .register_owned(Some(self.owner), kind, priority, phase, callback)?;
        self.keys.lock().push(key);
        Ok(key)
    }
}
