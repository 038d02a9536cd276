//! Two-tier read-through cache.
//!
//! # Architecture
//!
//! ```text
//! request → volatile (in-process) → durable (external) → compute
//!           hit: return             hit: repopulate      write through
//!                                   volatile, return     both tiers
//! ```
//!
//! A durable hit repopulates the volatile tier at the volatile default
//! TTL. A fresh compute writes through to both tiers, each at its own
//! TTL. Failed computes propagate and are never cached.
//!
//! Two simultaneous requests for the same cold key may both compute —
//! there is no single-flight here. When computation is routed through the
//! job queue (see [`EmbeddedGateway`](crate::gateway::EmbeddedGateway)),
//! the job body re-consults this cache at admission time, which collapses
//! queued twins of an already-resolved request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::telemetry;

use super::durable::DurableCacheAdapter;
use super::volatile::VolatileCache;

/// Volatile tier in front of a durable tier, consulted in that order.
pub struct TieredCache<T> {
    volatile: Arc<VolatileCache<T>>,
    durable: DurableCacheAdapter<T>,
}

impl<T> TieredCache<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Compose the two tiers.
    pub fn new(volatile: Arc<VolatileCache<T>>, durable: DurableCacheAdapter<T>) -> Self {
        Self { volatile, durable }
    }

    /// Look up a key in both tiers without computing.
    ///
    /// A durable hit repopulates the volatile tier before returning.
    pub async fn get(&self, key: &str) -> Option<T> {
        if let Some(value) = self.volatile.get(key) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "tier" => "volatile").increment(1);
            return Some(value);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "tier" => "volatile").increment(1);

        if let Some(value) = self.durable.lookup(key).await {
            self.volatile.set(key, value.clone(), None);
            return Some(value);
        }
        None
    }

    /// Return the cached value or compute, cache, and return it.
    ///
    /// `ttl_override` shortens or extends the volatile entry only; the
    /// durable tier always uses its configured TTL. Errors from `compute`
    /// propagate without being cached, so the next call retries.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        ttl_override: Option<Duration>,
        compute: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.volatile.set(key, value.clone(), ttl_override);
        self.durable.store(key, &value).await;
        Ok(value)
    }

    /// The volatile tier, for sweeping and introspection.
    pub fn volatile(&self) -> &Arc<VolatileCache<T>> {
        &self.volatile
    }

    /// The durable tier, for hit/miss counts and cost-saved accounting.
    pub fn durable(&self) -> &DurableCacheAdapter<T> {
        &self.durable
    }
}
