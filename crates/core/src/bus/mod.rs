//! Event bus - registration and synchronous dispatch
//!
//! # Architecture
//!
//! ```text
//! producer ──post(&Event)──▶ EventBus ──snapshot──▶ Registry
//!                               │
//!                               └─▶ subscriber 1 → subscriber 2 → … (same thread)
//! ```
//!
//! Dispatch never leaves the posting thread. Each subscriber runs inside
//! `catch_unwind`; a failing subscriber is recorded in the [`PostResult`]
//! and the next one still runs.

mod registry;
mod result;

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::BusConfig;
use crate::error::RegistrationError;
use crate::events::{Event, EventInfo, EventKind, EventPhase, HandlerResult, Subscribe};

pub use registry::{Registry, Snapshot, Subscription, SubscriptionKey};
pub use result::{DispatchFailure, FailureCause, PostResult};

/// Priority presets. Lower values run first.
pub mod priority {
    pub const EARLIEST: i32 = i32::MIN;
    pub const EARLY: i32 = -100;
    pub const NORMAL: i32 = 0;
    pub const LATE: i32 = 100;
    pub const LATEST: i32 = i32::MAX;
}

thread_local! {
    /// Nesting depth of `post` calls on this thread, per bus address
    ///
    /// Holds one entry per bus currently dispatching on this thread, so a
    /// post on one bus never spends another bus's depth budget.
    static DISPATCH_DEPTH: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Tracks one level of dispatch nesting for one bus on the current thread
struct DepthGuard {
    bus: usize,
}

impl DepthGuard {
    fn enter(bus: &EventBus) -> Option<Self> {
        let id = bus as *const EventBus as usize;
        DISPATCH_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            match depths.iter_mut().find(|(addr, _)| *addr == id) {
                Some((_, depth)) if *depth >= bus.max_dispatch_depth => return None,
                Some((_, depth)) => *depth += 1,
                None => depths.push((id, 1)),
            }
            Some(DepthGuard { bus: id })
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|depths| {
            let mut depths = depths.borrow_mut();
            if let Some(at) = depths.iter().position(|(addr, _)| *addr == self.bus) {
                depths[at].1 -= 1;
                if depths[at].1 == 0 {
                    depths.swap_remove(at);
                }
            }
        });
    }
}

/// Counters for monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Events posted
    pub posted: u64,
    /// Subscriber invocations
    pub invoked: u64,
    /// Contained subscriber failures
    pub failures: u64,
}

/// Typed publish/subscribe event bus
pub struct EventBus {
    registry: Registry,
    max_dispatch_depth: usize,
    slow_subscriber_warn: Duration,
    posted: AtomicU64,
    invoked: AtomicU64,
    failures: AtomicU64,
}

impl EventBus {
    /// Create a bus with default settings
    pub fn new() -> Self {
        Self::with_config(&BusConfig::default())
    }

    pub fn with_config(config: &BusConfig) -> Self {
        Self {
            registry: Registry::new(),
            max_dispatch_depth: config.max_dispatch_depth.max(1),
            slow_subscriber_warn: Duration::from_millis(config.slow_subscriber_warn_ms),
            posted: AtomicU64::new(0),
            invoked: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Register a subscriber tagged with the name of the module that owns it
    pub fn register_owned<F>(
        &self,
        owner: Option<&'static str>,
        kind: EventKind,
        priority: i32,
        phase: Option<EventPhase>,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&Event<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        if phase.is_some() && !kind.is_bracketing() {
            return Err(RegistrationError::PhaseNotSupported(kind));
        }

        let key = self
            .registry
            .insert(owner, kind, priority, phase, Box::new(callback))
            .ok_or(RegistrationError::Closed)?;
        tracing::debug!(
            "Registered {} subscriber {:?} for '{}' (priority {}, phase {:?})",
            owner.unwrap_or("anonymous"),
            key,
            kind,
            priority,
            phase
        );
        Ok(key)
    }

    /// Unregister a subscriber
    ///
    /// # Returns
    /// `true` if it was registered. Unregistering twice is a no-op.
    pub fn unregister(&self, key: SubscriptionKey) -> bool {
        let removed = self.registry.remove(key);
        if removed {
            tracing::debug!("Unregistered subscriber {:?}", key);
        }
        removed
    }

    /// Ordered snapshot of the subscribers for `kind`
    pub fn subscribers_for(&self, kind: EventKind) -> Snapshot {
        self.registry.subscribers_for(kind)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Post an event to every matching subscriber
    ///
    /// Subscribers run synchronously on the calling thread, ordered by
    /// priority then registration. Cancellation does not stop the remaining
    /// subscribers. Failures never propagate to the caller; they are
    /// returned in [`PostResult::failures`].
    pub fn post(&self, event: &Event<'_>) -> PostResult {
        let kind = event.kind();
        let mut result = PostResult::new(kind);

        let Some(_depth) = DepthGuard::enter(self) else {
            tracing::error!(
                "Refusing to post '{}': dispatch nested deeper than {}",
                kind,
                self.max_dispatch_depth
            );
            result.overflowed = true;
            return result;
        };

        self.posted.fetch_add(1, Ordering::Relaxed);

        let subscribers = self.registry.subscribers_for(kind);
        let phase = event.phase();
        let mut info = EventInfo::new(event);

        for subscriber in subscribers.iter() {
            if !subscriber.accepts(phase) {
                continue;
            }
            result.invoked += 1;

            let start = Instant::now();
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| subscriber.invoke(event, &mut info)));
            let elapsed = start.elapsed();

            if elapsed > self.slow_subscriber_warn {
                tracing::warn!(
                    "Subscriber {:?} ({}) took {}ms handling '{}'",
                    subscriber.key(),
                    subscriber.owner().unwrap_or("anonymous"),
                    elapsed.as_millis(),
                    kind
                );
            }

            let cause = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => FailureCause::Error(e.to_string()),
                Err(payload) => FailureCause::from_panic(payload),
            };

            let failure = DispatchFailure {
                key: subscriber.key(),
                owner: subscriber.owner(),
                kind,
                cause,
            };
            tracing::error!("{}", failure);
            result.failures.push(failure);
        }

        result.cancelled = info.is_cancelled();
        if result.cancelled {
            tracing::trace!("'{}' cancelled by a subscriber", kind);
        }

        self.invoked.fetch_add(result.invoked as u64, Ordering::Relaxed);
        self.failures
            .fetch_add(result.failures.len() as u64, Ordering::Relaxed);
        result
    }

    /// Remove every subscriber and reject further registrations
    ///
    /// Events posted afterwards reach no one.
    pub fn close(&self) {
        let removed = self.registry.close();
        tracing::debug!("Event bus closed ({} subscribers removed)", removed);
    }

    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }

    /// Snapshot of the dispatch counters
    pub fn stats(&self) -> BusStats {
        BusStats {
            posted: self.posted.load(Ordering::Relaxed),
            invoked: self.invoked.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscribe for EventBus {
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
        self.register_owned(None, kind, priority, phase, callback)
    }
}
