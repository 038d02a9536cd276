//! Durable cache tier: store capability and fail-open adapter.
//!
//! The durable tier is a performance optimization, never a correctness
//! requirement. Every failure path — transient store errors, timeouts,
//! values that no longer deserialize — degrades to a cache miss. Callers
//! never see a storage error; degradation is logged and counted under
//! [`STORE_DEGRADED_TOTAL`](crate::telemetry::STORE_DEGRADED_TOTAL).
//!
//! The [`DurableStore`] capability is implemented by the embedding
//! application over whatever persistence it has (Redis, DynamoDB, a SQL
//! table with an expiry column). The adapter only needs get/put/expire
//! semantics; values cross the boundary as JSON.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::telemetry;

/// Transient failure signal from a [`DurableStore`].
///
/// "Not found" is not an error — `get` returns `Ok(None)` for absent
/// keys. These variants mean the store could not answer at all.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store timed out after {0:?}")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// External key-value store with TTL expiry.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch a value. `Ok(None)` means not present (or expired).
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Store a value. After `ttl` the store must treat the key as absent.
    async fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), StoreError>;
}

/// Configuration for the durable cache tier.
///
/// ```rust
/// # use doorman::DurableCacheConfig;
/// # use std::time::Duration;
/// let config = DurableCacheConfig::new()
///     .ttl(Duration::from_secs(7 * 24 * 3600))
///     .cost_per_call(0.05);
/// ```
#[derive(Debug, Clone)]
pub struct DurableCacheConfig {
    /// TTL for stored entries. Longer than the volatile default — this
    /// tier models slowly-changing facts. Default: 24 hours.
    pub ttl: Duration,
    /// Estimated upstream cost of one avoided call, in dollars. Feeds
    /// [`DurableCacheAdapter::estimated_cost_saved`]. Default: $0.02.
    pub cost_per_call: f64,
}

impl Default for DurableCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 3600),
            cost_per_call: 0.02,
        }
    }
}

impl DurableCacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL for stored entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the estimated cost of one avoided upstream call.
    pub fn cost_per_call(mut self, dollars: f64) -> Self {
        self.cost_per_call = dollars;
        self
    }
}

/// Fail-open adapter over a [`DurableStore`], with hit/miss counters and
/// cost-saved accounting.
pub struct DurableCacheAdapter<T> {
    inner: Arc<dyn DurableStore>,
    config: DurableCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    _value: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> DurableCacheAdapter<T> {
    /// Wrap a store with the given configuration.
    pub fn new(inner: Arc<dyn DurableStore>, config: DurableCacheConfig) -> Self {
        Self {
            inner,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            _value: PhantomData,
        }
    }

    /// Look up a key, treating every store failure as a miss.
    pub async fn lookup(&self, key: &str) -> Option<T> {
        match self.inner.get(key).await {
            Ok(Some(raw)) => match serde_json::from_value(raw) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL, "tier" => "durable")
                        .increment(1);
                    Some(value)
                }
                Err(error) => {
                    warn!(key, %error, "durable entry failed to deserialize, treating as miss");
                    self.record_miss();
                    None
                }
            },
            Ok(None) => {
                self.record_miss();
                None
            }
            Err(error) => {
                warn!(key, %error, "durable store degraded, treating as miss");
                metrics::counter!(telemetry::STORE_DEGRADED_TOTAL).increment(1);
                self.record_miss();
                None
            }
        }
    }

    /// Store a value with the configured TTL. Failures are logged, never
    /// surfaced.
    pub async fn store(&self, key: &str, value: &T) {
        let raw = match serde_json::to_value(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key, %error, "value not serializable for durable tier");
                return;
            }
        };
        if let Err(error) = self.inner.put(key, raw, self.config.ttl).await {
            warn!(key, %error, "durable store rejected write");
            metrics::counter!(telemetry::STORE_DEGRADED_TOTAL).increment(1);
        }
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "tier" => "durable").increment(1);
    }

    /// Lookups answered by the store.
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups the store could not answer, including degraded ones.
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Estimated dollars saved by durable hits.
    pub fn estimated_cost_saved(&self) -> f64 {
        self.hit_count() as f64 * self.config.cost_per_call
    }
}
