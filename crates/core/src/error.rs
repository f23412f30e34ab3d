//! Error types for registration and lifecycle operations

use crate::config::ConfigError;
use crate::events::EventKind;

/// Error returned when a subscription cannot be created
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// A phase filter was given for a kind that is never posted with a phase
    #[error("Event '{0}' has no phases, a phase filter would never match")]
    PhaseNotSupported(EventKind),

    /// The bus was closed during shutdown
    #[error("Event bus is closed")]
    Closed,
}

/// Error type for context lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum LucidError {
    /// A module (or the task scheduler) failed to subscribe
    #[error("Module '{module}' failed to subscribe: {source}")]
    Registration {
        module: &'static str,
        #[source]
        source: RegistrationError,
    },

    /// `initialize` was called more than once
    #[error("Lucid already initialized")]
    AlreadyInitialized,

    /// A lifecycle step ran before `initialize`
    #[error("Lucid not initialized")]
    NotInitialized,

    /// The context was shut down
    #[error("Lucid has been shut down")]
    ShutDown,

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
