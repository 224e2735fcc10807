//! Fixed-size worker pool with a completion barrier.

use super::queue::{Job, TaskQueue};
use crate::log::Logger;
use crate::{log_debug, log_error, log_trace};
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Errors raised when starting the worker pool.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to spawn worker thread {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

struct State {
    queue: TaskQueue,
    /// Tasks currently running on a worker.
    active: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    /// Signalled when a task is queued or shutdown begins.
    work_available: Condvar,
    /// Signalled when the queue is empty and no task is running.
    idle: Condvar,
    completed: AtomicU64,
    panicked: AtomicU64,
}

impl Shared {
    fn is_idle(state: &State) -> bool {
        state.queue.is_empty() && state.active == 0
    }
}

/// A pool of worker threads executing queued closures.
///
/// ```
/// use etcpak::executor::Scheduler;
/// use etcpak::log::NoOpLogger;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let scheduler = Scheduler::new(4, Arc::new(NoOpLogger)).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..100 {
///     let counter = Arc::clone(&counter);
///     scheduler.queue(move || {
///         counter.fetch_add(1, Ordering::Relaxed);
///     });
/// }
/// scheduler.sync();
/// assert_eq!(counter.load(Ordering::Relaxed), 100);
/// ```
///
/// Dropping the scheduler runs every task still queued, then joins the
/// workers.
pub struct Scheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    logger: Arc<dyn Logger>,
}

impl Scheduler {
    /// Start `workers` threads (at least one).
    pub fn new(workers: usize, logger: Arc<dyn Logger>) -> Result<Self, SchedulerError> {
        let count = workers.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: TaskQueue::new(),
                active: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            idle: Condvar::new(),
            completed: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
        });

        let mut scheduler = Self {
            shared,
            workers: Vec::with_capacity(count),
            logger,
        };
        for index in 0..count {
            let shared = Arc::clone(&scheduler.shared);
            let logger = Arc::clone(&scheduler.logger);
            let handle = thread::Builder::new()
                .name(format!("etcpak-worker-{}", index))
                .spawn(move || worker_loop(shared, logger, index))
                .map_err(|source| SchedulerError::Spawn { index, source })?;
            scheduler.workers.push(handle);
        }

        log_debug!(scheduler.logger, "Scheduler started with {} workers", count);
        Ok(scheduler)
    }

    /// Start one worker per available CPU.
    pub fn with_default_workers(logger: Arc<dyn Logger>) -> Result<Self, SchedulerError> {
        Self::new(default_worker_count(), logger)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue a task for execution on any worker.
    pub fn queue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(task);
        let mut state = self.shared.state.lock();
        state.queue.push(job);
        drop(state);
        self.shared.work_available.notify_one();
    }

    /// Block until every queued task has finished.
    ///
    /// Must not be called from inside a task: the calling worker would
    /// wait on itself.
    pub fn sync(&self) {
        let mut state = self.shared.state.lock();
        while !Shared::is_idle(&state) {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Tasks queued but not yet started.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Tasks finished since the scheduler started, including panicked ones.
    pub fn tasks_completed(&self) -> u64 {
        self.shared.completed.load(Ordering::Relaxed)
    }

    /// Tasks that panicked.
    pub fn tasks_panicked(&self) -> u64 {
        self.shared.panicked.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("workers", &self.workers.len())
            .field("completed", &self.tasks_completed())
            .finish()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.work_available.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log_error!(self.logger, "Worker thread terminated abnormally");
            }
        }
        log_debug!(
            self.logger,
            "Scheduler stopped after {} tasks",
            self.shared.completed.load(Ordering::Relaxed)
        );
    }
}

/// Number of workers used when none is configured.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn worker_loop(shared: Arc<Shared>, logger: Arc<dyn Logger>, index: usize) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.queue.pop() {
                    state.active += 1;
                    break task;
                }
                // Queue drained; exit only once shutdown was requested.
                if state.shutdown {
                    return;
                }
                shared.work_available.wait(&mut state);
            }
        };

        let sequence = task.sequence();
        log_trace!(
            logger,
            "Worker {} starting task {} after {:?} queued",
            index,
            sequence,
            task.wait_time()
        );
        if panic::catch_unwind(AssertUnwindSafe(move || task.run())).is_err() {
            shared.panicked.fetch_add(1, Ordering::Relaxed);
            log_error!(logger, "Task {} panicked on worker {}", sequence, index);
        }
        shared.completed.fetch_add(1, Ordering::Relaxed);

        let mut state = shared.state.lock();
        state.active -= 1;
        if Shared::is_idle(&state) {
            shared.idle.notify_all();
        }
    }
}
