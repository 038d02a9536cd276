//! Token-bucket rate limiter.
//!
//! Bounds outbound call throughput across all callers. Tokens are
//! consumed at admission and replenished on a fixed cadence by the
//! queue's refill ticker. [`RateLimiter::try_consume`] never blocks:
//! when the bucket is empty the scheduler simply stops admitting until
//! the next refill.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Configuration for the token bucket.
///
/// ```rust
/// # use doorman::RateLimiterConfig;
/// # use std::time::Duration;
/// let config = RateLimiterConfig::new()
///     .capacity(20)
///     .refill_amount(5)
///     .refill_interval(Duration::from_secs(1));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum tokens the bucket holds. Default: 10.
    pub capacity: u32,
    /// Tokens added per refill tick. Default: 2.
    pub refill_amount: u32,
    /// Interval between refill ticks. Default: 1 second.
    pub refill_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_amount: 2,
            refill_interval: Duration::from_secs(1),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket capacity.
    pub fn capacity(mut self, n: u32) -> Self {
        self.capacity = n;
        self
    }

    /// Set the tokens added per refill tick.
    pub fn refill_amount(mut self, n: u32) -> Self {
        self.refill_amount = n;
        self
    }

    /// Set the interval between refill ticks.
    pub fn refill_interval(mut self, every: Duration) -> Self {
        self.refill_interval = every;
        self
    }
}

/// Lock-free token bucket. Starts full.
pub struct RateLimiter {
    capacity: u32,
    refill_amount: u32,
    available: AtomicU32,
}

impl RateLimiter {
    /// Create a bucket filled to capacity.
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            capacity: config.capacity,
            refill_amount: config.refill_amount,
            available: AtomicU32::new(config.capacity),
        }
    }

    /// Take one token.
    ///
    /// Returns `false` with no side effects when the bucket is empty.
    pub fn try_consume(&self) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Add the configured refill amount, clamped at capacity.
    pub fn refill(&self) {
        let _ = self
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(self.refill_amount).min(self.capacity))
            });
    }

    /// Tokens currently available.
    pub fn available(&self) -> u32 {
        self.available.load(Ordering::Acquire)
    }

    /// Maximum tokens the bucket holds.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
