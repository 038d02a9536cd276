//! In-process gateway: cache-first request path over the job queue.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::Result;
use crate::cache::{
    CacheKey, DurableCacheAdapter, DurableCacheConfig, DurableStore, TieredCache, VolatileCache,
    VolatileCacheConfig,
};
use crate::queue::{PriorityJobQueue, QueueConfig, QueueStats, Tier};

/// One queue plus one tiered cache, wired for the request flow:
/// cache hit → return immediately; miss → queue the computation.
///
/// Built via [`Doorman::builder()`](crate::Doorman::builder). Holds the
/// refill ticker and cache sweeper for its whole lifetime; both stop when
/// the gateway is dropped or [`shutdown`](Self::shutdown) is called.
pub struct EmbeddedGateway<T> {
    queue: Arc<PriorityJobQueue<T>>,
    cache: Arc<TieredCache<T>>,
    sweeper: JoinHandle<()>,
}

impl<T> EmbeddedGateway<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new(
        queue_config: QueueConfig,
        volatile_config: VolatileCacheConfig,
        durable_config: DurableCacheConfig,
        store: Arc<dyn DurableStore>,
    ) -> Self {
        let volatile = Arc::new(VolatileCache::new(volatile_config));
        let sweeper = Arc::clone(&volatile).spawn_sweeper();
        let cache = Arc::new(TieredCache::new(
            volatile,
            DurableCacheAdapter::new(store, durable_config),
        ));
        let queue = PriorityJobQueue::new(queue_config);
        Self {
            queue,
            cache,
            sweeper,
        }
    }

    /// Serve one request: cache first, queue on miss.
    ///
    /// A cache hit returns immediately and consumes neither a concurrency
    /// slot nor a rate-limiter token. On a miss the computation is
    /// queued; the job re-consults the cache at admission, so an
    /// identical request resolved while this one waited is served without
    /// a second upstream call.
    pub async fn request<F, Fut>(
        &self,
        caller_id: impl Into<String>,
        tier: Tier,
        key: &CacheKey,
        compute: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send,
    {
        if let Some(value) = self.cache.get(key.as_str()).await {
            return Ok(value);
        }

        let cache = Arc::clone(&self.cache);
        let key = key.clone();
        let handle = self.queue.submit(caller_id, tier, async move {
            cache.get_or_compute(key.as_str(), None, compute).await
        });
        handle.await
    }

    /// 1-based queue rank of the caller's earliest pending job; 0 if none.
    pub fn position(&self, caller_id: &str) -> usize {
        self.queue.position(caller_id)
    }

    /// Estimated seconds until the caller's earliest pending job is
    /// admitted.
    pub fn estimated_wait_seconds(&self, caller_id: &str) -> u64 {
        self.queue.estimated_wait_seconds(caller_id)
    }

    /// Point-in-time queue counters.
    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Cancel all of the caller's still-queued jobs; returns the count.
    pub fn cancel(&self, caller_id: &str) -> usize {
        self.queue.cancel(caller_id)
    }

    /// The tiered cache, for durable hit/miss counts and cost-saved
    /// accounting.
    pub fn cache(&self) -> &TieredCache<T> {
        &self.cache
    }

    /// The underlying queue, for direct submissions that bypass caching.
    pub fn queue(&self) -> &Arc<PriorityJobQueue<T>> {
        &self.queue
    }

    /// Stop the refill ticker and cache sweeper.
    pub fn shutdown(&self) {
        self.queue.shutdown();
        self.sweeper.abort();
    }
}

impl<T> Drop for EmbeddedGateway<T> {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
