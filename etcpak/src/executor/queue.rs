//! FIFO queue of pending scheduler tasks.
//!
//! Tasks are dequeued in the order they were queued. Each task carries a
//! sequence number and its enqueue time for diagnostics.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A unit of work for the scheduler.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

// =============================================================================
// Queued Task
// =============================================================================

/// A task waiting to be executed.
pub struct QueuedTask {
    job: Job,

    /// Position in the queue's submission order.
    sequence: u64,

    /// When the task was enqueued.
    enqueued_at: Instant,
}

impl QueuedTask {
    fn new(job: Job, sequence: u64) -> Self {
        Self {
            job,
            sequence,
            enqueued_at: Instant::now(),
        }
    }

    /// Submission order within the queue that produced this task.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns how long this task has been waiting in the queue.
    pub fn wait_time(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    /// Run the task, consuming it.
    pub fn run(self) {
        (self.job)()
    }
}

impl std::fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedTask")
            .field("sequence", &self.sequence)
            .field("enqueued_at", &self.enqueued_at)
            .finish()
    }
}

// =============================================================================
// Task Queue
// =============================================================================

/// First-in, first-out task queue.
///
/// The queue is not thread-safe; the scheduler wraps it in a mutex.
#[derive(Default)]
pub struct TaskQueue {
    tasks: VecDeque<QueuedTask>,
    next_sequence: u64,
}

impl TaskQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the back of the queue and returns its sequence number.
    pub fn push(&mut self, job: Job) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.tasks.push_back(QueuedTask::new(job, sequence));
        sequence
    }

    /// Removes and returns the oldest task.
    pub fn pop(&mut self) -> Option<QueuedTask> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.tasks.len())
            .field("submitted", &self.next_sequence)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
