//! Work deferred to the tick thread

mod scheduler;

pub use scheduler::{Task, TaskError, TaskScheduler};
