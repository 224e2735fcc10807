//! Task execution.
//!
//! The [`Scheduler`] owns a fixed set of named worker threads fed from a
//! shared FIFO [`TaskQueue`]. Callers queue closures, then call
//! [`Scheduler::sync`] as the barrier before reading results.

mod queue;
mod scheduler;

pub use queue::{Job, QueuedTask, TaskQueue};
pub use scheduler::{default_worker_count, Scheduler, SchedulerError};
