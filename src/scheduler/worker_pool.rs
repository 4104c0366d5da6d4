//! Bounded worker pool for batch generation.
//!
//! A fixed number of workers pull task descriptors from a shared cursor over
//! the (id-sorted) task list. Each worker runs one generation call at a time,
//! so at most `num_workers` calls are ever in flight.
//!
//! # Failure policy
//!
//! No task is ever dropped. A transport error, malformed output, per-call
//! timeout or panic inside the generator becomes a fallback record for that
//! task and nothing else. Every task therefore fills exactly one outcome slot.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::collector::{order_tasks, OutcomeSlots};
use crate::error::{GenerationError, PoolError};
use crate::generator::{Outcome, RecordGenerator};
use crate::tasks::TaskDescriptor;

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of workers, i.e. the concurrency limit.
    pub num_workers: usize,
    /// Deadline for a single generation call.
    pub call_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            num_workers: 5,
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl WorkerPoolConfig {
    /// Creates a new configuration with the specified number of workers.
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Sets the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Statistics about one pool run.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Workers spawned for the run.
    pub num_workers: usize,
    /// Tasks submitted.
    pub tasks_submitted: usize,
    /// Tasks whose generation succeeded.
    pub successes: u64,
    /// Tasks that produced a fallback record.
    pub fallbacks: u64,
    /// Highest number of generation calls observed in flight at once.
    pub peak_in_flight: usize,
    /// Average generation call duration.
    pub average_call_duration: Duration,
    /// Wall-clock duration of the whole run.
    pub elapsed: Duration,
}

impl PoolStats {
    /// Returns the total number of tasks processed.
    pub fn total_processed(&self) -> u64 {
        self.successes + self.fallbacks
    }

    /// Returns the success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            return 0.0;
        }
        (self.successes as f64 / total as f64) * 100.0
    }
}

/// Shared state for tracking pool statistics.
struct SharedPoolStats {
    successes: AtomicU64,
    fallbacks: AtomicU64,
    total_duration_ms: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl SharedPoolStats {
    fn new() -> Self {
        Self {
            successes: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
            total_duration_ms: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn call_started(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn call_finished(&self, duration: Duration, fallback: bool) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if fallback {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        } else {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }
        self.total_duration_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    fn to_pool_stats(&self, num_workers: usize, tasks_submitted: usize, elapsed: Duration) -> PoolStats {
        let successes = self.successes.load(Ordering::SeqCst);
        let fallbacks = self.fallbacks.load(Ordering::SeqCst);
        let total_duration_ms = self.total_duration_ms.load(Ordering::SeqCst);

        let total = successes + fallbacks;
        let average_call_duration = if total > 0 {
            Duration::from_millis(total_duration_ms / total)
        } else {
            Duration::ZERO
        };

        PoolStats {
            num_workers,
            tasks_submitted,
            successes,
            fallbacks,
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
            average_call_duration,
            elapsed,
        }
    }
}

/// Fixed task list with a shared claim cursor.
struct TaskQueue {
    tasks: Vec<TaskDescriptor>,
    cursor: AtomicUsize,
}

impl TaskQueue {
    /// Claims the next unclaimed task and its slot index.
    fn next(&self) -> Option<(usize, &TaskDescriptor)> {
        let slot = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.tasks.get(slot).map(|task| (slot, task))
    }
}

/// Outcomes of a pool run, in ascending task id order.
#[derive(Debug)]
pub struct DispatchReport {
    pub outcomes: Vec<Outcome>,
    pub stats: PoolStats,
}

/// Worker pool that executes a fixed task set against a [`RecordGenerator`].
pub struct WorkerPool {
    config: WorkerPoolConfig,
}

impl WorkerPool {
    /// Creates a new worker pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::ZeroConcurrency` if `num_workers` is 0.
    pub fn new(config: WorkerPoolConfig) -> Result<Self, PoolError> {
        if config.num_workers == 0 {
            return Err(PoolError::ZeroConcurrency);
        }
        Ok(Self { config })
    }

    /// Returns the concurrency limit.
    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    /// Runs every task and returns exactly one outcome per task, ordered by id.
    ///
    /// Completion order is whatever the external calls produce; the returned
    /// order never depends on it.
    ///
    /// # Errors
    ///
    /// Only invariant violations: duplicate task ids, or a missing/misfiled
    /// outcome. Per-task generation failures never surface here.
    pub async fn run(
        &self,
        tasks: Vec<TaskDescriptor>,
        generator: Arc<dyn RecordGenerator>,
    ) -> Result<DispatchReport, PoolError> {
        let started = Instant::now();
        let tasks = order_tasks(tasks)?;
        let submitted = tasks.len();
        let num_workers = self.config.num_workers.min(submitted);

        let slots = Arc::new(OutcomeSlots::for_tasks(&tasks));
        let queue = Arc::new(TaskQueue {
            tasks,
            cursor: AtomicUsize::new(0),
        });
        let stats = Arc::new(SharedPoolStats::new());

        info!(tasks = submitted, workers = num_workers, "Dispatching generation tasks");

        let handles: Vec<_> = (0..num_workers)
            .map(|i| {
                let worker = Worker {
                    id: format!("worker-{}", i),
                    queue: Arc::clone(&queue),
                    generator: Arc::clone(&generator),
                    slots: Arc::clone(&slots),
                    stats: Arc::clone(&stats),
                    call_timeout: self.config.call_timeout,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        for joined in futures::future::join_all(handles).await {
            joined.map_err(|e| PoolError::WorkerFailed(e.to_string()))??;
        }

        let slots = Arc::try_unwrap(slots).map_err(|_| {
            PoolError::WorkerFailed("outcome slots still shared after workers finished".to_string())
        })?;
        let outcomes = slots.finish()?;

        let stats = stats.to_pool_stats(num_workers, submitted, started.elapsed());
        info!(
            tasks = submitted,
            successes = stats.successes,
            fallbacks = stats.fallbacks,
            peak_in_flight = stats.peak_in_flight,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Generation dispatch complete"
        );

        Ok(DispatchReport { outcomes, stats })
    }
}

/// A single worker draining the shared task queue.
struct Worker {
    id: String,
    queue: Arc<TaskQueue>,
    generator: Arc<dyn RecordGenerator>,
    slots: Arc<OutcomeSlots>,
    stats: Arc<SharedPoolStats>,
    call_timeout: Duration,
}

impl Worker {
    /// Claims and executes tasks until the queue is exhausted.
    async fn run(self) -> Result<(), PoolError> {
        debug!(worker_id = %self.id, "Worker started");

        while let Some((slot, task)) = self.queue.next() {
            let outcome = self.execute(task).await;
            self.slots.fill(slot, outcome)?;
        }

        debug!(worker_id = %self.id, "Worker stopped");
        Ok(())
    }

    /// Executes one task, folding every failure mode into a fallback.
    async fn execute(&self, task: &TaskDescriptor) -> Outcome {
        let task_id = task.id();
        let started = Instant::now();
        self.stats.call_started();

        // The call runs as its own task so a panic stays contained to it.
        let generator = Arc::clone(&self.generator);
        let owned = task.clone();
        let mut handle = tokio::spawn(async move { generator.generate(&owned).await });

        let result = match tokio::time::timeout(self.call_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(GenerationError::WorkerPanicked {
                task_id,
                cause: join_error.to_string(),
            }),
            Err(_) => {
                // Wait for the abort to land so the slot is really free.
                handle.abort();
                let _ = handle.await;
                Err(GenerationError::Timeout {
                    task_id,
                    seconds: self.call_timeout.as_secs(),
                })
            }
        };

        let duration = started.elapsed();
        let outcome = match result {
            Ok(raw) => {
                debug!(worker_id = %self.id, task_id, duration_ms = duration.as_millis() as u64, "Task generated");
                Outcome::from_result(task, Ok(raw))
            }
            Err(err) => {
                warn!(worker_id = %self.id, task_id, error = %err, "Generation failed, using fallback record");
                Outcome::from_result(task, Err(err))
            }
        };

        self.stats.call_finished(duration, outcome.is_fallback());
        outcome
    }
}
