//! Queueing subsystem.
//!
//! [`PriorityJobQueue`] is the single admission decision point in front
//! of expensive upstream calls. It composes:
//!
//! - [`RateLimiter`] — a token bucket bounding throughput across all
//!   callers, refilled on a fixed cadence by the queue's owned ticker.
//!
//! - [`QueueStatsTracker`] — running wait/processing aggregates feeding
//!   the wait estimates reported to queued callers.
//!
//! Callers get a [`JobHandle`] per submitted job, resolved exactly once
//! with the result, a cancellation, or queue closure.

pub mod job;
pub mod limiter;
pub mod scheduler;
pub mod stats;

pub use job::{JobHandle, Tier};
pub use limiter::{RateLimiter, RateLimiterConfig};
pub use scheduler::{PriorityJobQueue, QueueConfig};
pub use stats::{QueueStats, QueueStatsTracker};
