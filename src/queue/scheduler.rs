//! Priority admission scheduling.
//!
//! [`PriorityJobQueue`] fronts expensive upstream calls with a single
//! serialized admission decision point. Jobs wait in a pending set
//! ordered by tier priority then arrival; admission requires both a free
//! concurrency slot and a rate-limiter token. Admitted computations run
//! in spawned tasks, so the admission critical section never awaits.
//!
//! The admission loop re-runs after every enqueue, after every terminal
//! transition (to backfill the freed slot immediately), and on every
//! refill tick.
//!
//! # Ordering
//!
//! Paid jobs always precede free jobs, regardless of arrival order;
//! within a tier, order is strict FIFO. There is no per-caller fairness
//! cap and no pending-length bound: a sustained paid burst can starve
//! free jobs, and backpressure surfaces as estimated wait time, never as
//! rejection.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{DoormanError, Result};
use crate::telemetry;

use super::job::{Job, JobHandle, Tier};
use super::limiter::{RateLimiter, RateLimiterConfig};
use super::stats::{QueueStats, QueueStatsTracker};

/// Configuration for [`PriorityJobQueue`].
///
/// ```rust
/// # use doorman::{QueueConfig, RateLimiterConfig};
/// let config = QueueConfig::new()
///     .max_concurrent(5)
///     .limiter(RateLimiterConfig::new().capacity(20));
/// ```
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum jobs processing at once. Default: 3.
    pub max_concurrent: usize,
    /// Token bucket shared across all callers.
    pub limiter: RateLimiterConfig,
    /// Processing-time estimate used for wait estimates until the first
    /// job reaches a terminal state. Default: 5 seconds.
    pub fallback_processing_estimate: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            limiter: RateLimiterConfig::default(),
            fallback_processing_estimate: Duration::from_secs(5),
        }
    }
}

impl QueueConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency ceiling.
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set the token bucket configuration.
    pub fn limiter(mut self, config: RateLimiterConfig) -> Self {
        self.limiter = config;
        self
    }

    /// Set the processing-time estimate used before any job completes.
    pub fn fallback_processing_estimate(mut self, estimate: Duration) -> Self {
        self.fallback_processing_estimate = estimate;
        self
    }
}

/// Ordering key: paid (weight 1) sorts before free, then FIFO by arrival
/// sequence.
type JobKey = (Reverse<u8>, u64);

struct Inner<T> {
    pending: BTreeMap<JobKey, Job<T>>,
    processing: usize,
}

/// Tier-priority job queue with a concurrency ceiling and a shared token
/// bucket.
///
/// All queue-state transitions happen under one mutex; computations run
/// in spawned tasks outside it, up to `max_concurrent` at once.
pub struct PriorityJobQueue<T> {
    inner: Mutex<Inner<T>>,
    limiter: RateLimiter,
    stats: QueueStatsTracker,
    config: QueueConfig,
    next_seq: AtomicU64,
    refill_task: Mutex<Option<JoinHandle<()>>>,
    // Handed to spawned job drivers so they can report back and backfill
    // the freed slot. Always upgradable while the queue is alive.
    weak_self: Weak<PriorityJobQueue<T>>,
}

impl<T> PriorityJobQueue<T> {
    fn lock_inner(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop the refill ticker.
    ///
    /// Pending and in-flight jobs are unaffected, but once the bucket
    /// drains nothing new is admitted.
    pub fn shutdown(&self) {
        let task = self
            .refill_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    /// 1-based rank of `caller_id`'s earliest pending job; 0 if none.
    pub fn position(&self, caller_id: &str) -> usize {
        let inner = self.lock_inner();
        inner
            .pending
            .values()
            .position(|job| job.caller_id == caller_id)
            .map_or(0, |idx| idx + 1)
    }

    /// Estimated seconds until `caller_id`'s earliest pending job is
    /// admitted.
    ///
    /// `ceil((rank / max_concurrent) × average processing ms / 1000)`,
    /// using the configured fallback estimate until the first terminal
    /// transition. 0 when the caller has nothing queued.
    pub fn estimated_wait_seconds(&self, caller_id: &str) -> u64 {
        let rank = self.position(caller_id);
        if rank == 0 {
            return 0;
        }
        let average_ms = if self.stats.samples() == 0 {
            self.config.fallback_processing_estimate.as_millis() as u64
        } else {
            self.stats.average_processing_ms()
        };
        let seconds =
            (rank as f64 / self.config.max_concurrent as f64) * average_ms as f64 / 1000.0;
        seconds.ceil() as u64
    }

    /// Cancel all of `caller_id`'s still-queued jobs.
    ///
    /// Processing jobs are untouched — an in-flight upstream call is
    /// already paid for and runs to completion. Each cancelled handle
    /// resolves with [`DoormanError::Cancelled`]. Returns the number
    /// removed.
    pub fn cancel(&self, caller_id: &str) -> usize {
        let cancelled: Vec<Job<T>> = {
            let mut inner = self.lock_inner();
            let keys: Vec<JobKey> = inner
                .pending
                .iter()
                .filter(|(_, job)| job.caller_id == caller_id)
                .map(|(key, _)| *key)
                .collect();
            let jobs = keys
                .iter()
                .filter_map(|key| inner.pending.remove(key))
                .collect();
            metrics::gauge!(telemetry::QUEUE_DEPTH).set(inner.pending.len() as f64);
            jobs
        };

        let count = cancelled.len();
        for job in cancelled {
            metrics::counter!(telemetry::JOBS_TOTAL,
                "tier" => job.tier.as_str(),
                "status" => "cancelled",
            )
            .increment(1);
            let _ = job.resolve.send(Err(DoormanError::Cancelled));
        }
        if count > 0 {
            debug!(caller_id, count, "cancelled queued jobs");
        }
        count
    }

    /// Point-in-time counters for the stats endpoint.
    pub fn stats(&self) -> QueueStats {
        let (queued, processing) = {
            let inner = self.lock_inner();
            (inner.pending.len(), inner.processing)
        };
        QueueStats {
            queued_jobs: queued,
            processing_jobs: processing,
            completed_jobs: self.stats.completed(),
            failed_jobs: self.stats.failed(),
            average_wait_ms: self.stats.average_wait_ms(),
            average_processing_ms: self.stats.average_processing_ms(),
        }
    }

    /// The shared token bucket.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl<T: Send + 'static> PriorityJobQueue<T> {
    /// Create a queue and start its refill ticker.
    ///
    /// The ticker holds a `Weak` reference and exits on its own once the
    /// queue is dropped; [`shutdown`](Self::shutdown) stops it
    /// immediately.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn new(config: QueueConfig) -> Arc<Self> {
        let queue = Arc::new_cyclic(|weak| Self {
            inner: Mutex::new(Inner {
                pending: BTreeMap::new(),
                processing: 0,
            }),
            limiter: RateLimiter::new(&config.limiter),
            stats: QueueStatsTracker::new(),
            next_seq: AtomicU64::new(1),
            refill_task: Mutex::new(None),
            weak_self: weak.clone(),
            config,
        });
        let task = Self::spawn_refill(&queue);
        *queue
            .refill_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
        queue
    }

    fn spawn_refill(queue: &Arc<Self>) -> JoinHandle<()> {
        let every = queue.config.limiter.refill_interval;
        let weak = Arc::downgrade(queue);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(queue) = weak.upgrade() else { break };
                queue.limiter.refill();
                queue.try_admit();
            }
        })
    }

    /// Enqueue a computation for `caller_id` at `tier`.
    ///
    /// Returns immediately with a handle resolving to the computation's
    /// result. Admission is attempted synchronously, so the job may
    /// already be processing when this returns. The queue is unbounded:
    /// enqueueing never rejects, and backpressure surfaces through
    /// [`estimated_wait_seconds`](Self::estimated_wait_seconds).
    pub fn submit<F>(
        &self,
        caller_id: impl Into<String>,
        tier: Tier,
        computation: F,
    ) -> JobHandle<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let id = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let job = Job {
            id,
            caller_id: caller_id.into(),
            tier,
            computation: Box::pin(computation),
            enqueued_at: Instant::now(),
            resolve: tx,
        };
        {
            let mut inner = self.lock_inner();
            inner.pending.insert((Reverse(tier.weight()), id), job);
            metrics::gauge!(telemetry::QUEUE_DEPTH).set(inner.pending.len() as f64);
        }
        self.try_admit();
        JobHandle { id, rx }
    }

    /// Run the admission loop until a stop condition holds: ceiling
    /// reached, pending set empty, or bucket drained.
    ///
    /// Tokens are only consumed once a job is known to be available, so
    /// an idle queue never drains the bucket.
    fn try_admit(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        loop {
            let job = {
                let mut inner = self.lock_inner();
                if inner.processing >= self.config.max_concurrent {
                    return;
                }
                if inner.pending.is_empty() {
                    return;
                }
                if !self.limiter.try_consume() {
                    return;
                }
                let (_, job) = inner
                    .pending
                    .pop_first()
                    .expect("pending checked non-empty under lock");
                inner.processing += 1;
                metrics::gauge!(telemetry::QUEUE_DEPTH).set(inner.pending.len() as f64);
                job
            };

            let started_at = Instant::now();
            let wait = started_at.duration_since(job.enqueued_at);
            debug!(
                job_id = job.id,
                caller_id = %job.caller_id,
                tier = job.tier.as_str(),
                wait_ms = wait.as_millis() as u64,
                "admitted job"
            );

            let queue = Arc::clone(&this);
            let Job {
                tier,
                computation,
                resolve,
                ..
            } = job;
            tokio::spawn(async move {
                let result = computation.await;
                let processing_time = started_at.elapsed();

                match &result {
                    Ok(_) => queue.stats.record_completed(wait, processing_time),
                    Err(_) => queue.stats.record_failed(wait, processing_time),
                }
                let status = if result.is_ok() { "ok" } else { "error" };
                metrics::counter!(telemetry::JOBS_TOTAL,
                    "tier" => tier.as_str(),
                    "status" => status,
                )
                .increment(1);
                metrics::histogram!(telemetry::JOB_WAIT_SECONDS, "tier" => tier.as_str())
                    .record(wait.as_secs_f64());
                metrics::histogram!(telemetry::JOB_PROCESSING_SECONDS, "tier" => tier.as_str())
                    .record(processing_time.as_secs_f64());

                {
                    let mut inner = queue.lock_inner();
                    inner.processing -= 1;
                }
                // The caller may have dropped its handle; the slot and
                // token are still accounted.
                let _ = resolve.send(result);
                queue.try_admit();
            });
        }
    }
}

impl<T> Drop for PriorityJobQueue<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
