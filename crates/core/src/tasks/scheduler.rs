//! Tick-delayed task scheduler
//!
//! Lets any thread (typically the network thread inside a packet
//! subscriber) queue work that must run on the tick thread. Submissions go
//! through a bounded channel; the scheduler drains it on every PRE tick.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::bus::{priority, FailureCause, SubscriptionKey};
use crate::config::TaskConfig;
use crate::error::RegistrationError;
use crate::events::{EventPhase, Subscribe};

/// A task to execute on the tick thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Error returned when a task cannot be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The submission queue is at capacity; the task was dropped
    #[error("Task queue full")]
    QueueFull,

    /// The scheduler was dropped
    #[error("Task queue disconnected")]
    Disconnected,
}

/// A task waiting for its tick
struct DelayedTask {
    /// PRE ticks still to skip before running
    remaining: u32,
    task: Task,
}

/// Schedules closures to run a number of ticks in the future
pub struct TaskScheduler {
    sender: Sender<DelayedTask>,
    receiver: Receiver<DelayedTask>,
    /// Tasks drained from the channel, waiting for their tick
    pending: Mutex<Vec<DelayedTask>>,
    max_per_tick: usize,
}

impl TaskScheduler {
    pub fn new(config: &TaskConfig) -> Self {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));
        Self {
            sender,
            receiver,
            pending: Mutex::new(Vec::new()),
            max_per_tick: config.max_per_tick.max(1),
        }
    }

    /// Queue a task to run after `ticks` PRE ticks have been skipped
    ///
    /// `schedule(0, ..)` runs on the next PRE tick. Safe to call from any
    /// thread, including from inside a running task (it then runs on a
    /// later tick).
    #[tracing::instrument(skip(self, task))]
    pub fn schedule<F>(&self, ticks: u32, task: F) -> Result<(), TaskError>
    where
        F: FnOnce() + Send + 'static,
    {
        let delayed = DelayedTask {
            remaining: ticks,
            task: Box::new(task),
        };
        match self.sender.try_send(delayed) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Task queue full, dropping task");
                Err(TaskError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Task queue disconnected");
                Err(TaskError::Disconnected)
            }
        }
    }

    /// Advance one tick
    ///
    /// Called on every PRE tick. Runs due tasks in submission order and
    /// returns how many ran. Tasks beyond the per-tick budget stay due and
    /// run on the next tick.
    #[tracing::instrument(skip(self))]
    pub fn process_tick(&self) -> usize {
        let due = {
            let mut pending = self.pending.lock();
            pending.extend(self.receiver.try_iter());

            let mut due = Vec::new();
            let mut waiting = Vec::with_capacity(pending.len());
            for mut delayed in pending.drain(..) {
                if delayed.remaining == 0 && due.len() < self.max_per_tick {
                    due.push(delayed.task);
                } else {
                    delayed.remaining = delayed.remaining.saturating_sub(1);
                    waiting.push(delayed);
                }
            }
            *pending = waiting;
            due
        };

        // Run outside the lock so tasks can schedule more work
        let count = due.len();
        for task in due {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                tracing::error!("Delayed task {}", FailureCause::from_panic(payload));
            }
        }
        count
    }

    /// Drive this scheduler from PRE ticks posted to `subscriber`
    ///
    /// Registered at [`priority::EARLIEST`] so due tasks finish before any
    /// other tick subscriber runs.
    pub fn subscribe<S: Subscribe>(
        self: &Arc<Self>,
        subscriber: &S,
    ) -> Result<SubscriptionKey, RegistrationError> {
        let scheduler = Arc::clone(self);
        subscriber.on_tick(priority::EARLIEST, Some(EventPhase::Pre), move |_, _| {
            scheduler.process_tick();
            Ok(())
        })
    }

    /// Number of tasks not yet run (queued and pending)
    pub fn queued_task_count(&self) -> usize {
        self.receiver.len() + self.pending.lock().len()
    }

    /// Drop every queued task without running it
    pub fn clear(&self) -> usize {
        let mut pending = self.pending.lock();
        let dropped = pending.len() + self.receiver.try_iter().count();
        pending.clear();
        dropped
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(&TaskConfig::default())
    }
}
