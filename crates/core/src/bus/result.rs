//! Dispatch outcome types

use std::any::Any;
use std::fmt;

use super::registry::SubscriptionKey;
use crate::events::EventKind;

/// Why a subscriber failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The callback returned an error
    Error(String),
    /// The callback panicked
    Panic(String),
}

impl FailureCause {
    /// Build a cause from a `catch_unwind` payload
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panic(message)
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(msg) => write!(f, "returned error: {}", msg),
            Self::Panic(msg) => write!(f, "panicked: {}", msg),
        }
    }
}

/// A subscriber failure contained by the bus during one dispatch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Subscriber {key:?} ({}) failed handling '{kind}': {cause}", .owner.unwrap_or("anonymous"))]
pub struct DispatchFailure {
    pub key: SubscriptionKey,
    pub owner: Option<&'static str>,
    pub kind: EventKind,
    pub cause: FailureCause,
}

/// Outcome of [`EventBus::post`](super::EventBus::post)
#[derive(Debug, Clone)]
pub struct PostResult {
    /// Kind of the posted event
    pub kind: EventKind,
    /// Number of subscribers invoked (after phase filtering)
    pub invoked: usize,
    /// Final cancellation state; always `false` for non-cancellable kinds
    pub cancelled: bool,
    /// Subscribers that returned an error or panicked, in invocation order
    pub failures: Vec<DispatchFailure>,
    /// Dispatch was refused because re-entrant posts nested too deep
    pub overflowed: bool,
}

impl PostResult {
    pub(crate) fn new(kind: EventKind) -> Self {
        Self {
            kind,
            invoked: 0,
            cancelled: false,
            failures: Vec::new(),
            overflowed: false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
