//! In-process volatile cache tier.
//!
//! [`VolatileCache`] is a bounded TTL map modelling hot repeats within a
//! session. Eviction at capacity is strict insertion order: the
//! least-recently-inserted live entry goes first, no matter how often it
//! was read. Reads never reorder entries.
//!
//! Expired entries are evicted lazily by `get`, so correctness never
//! depends on the sweep. [`VolatileCache::sweep`] proactively removes
//! them anyway; [`VolatileCache::spawn_sweeper`] drives it on an
//! interval.
//!
//! Absence is a normal outcome, not a failure — no method here returns
//! an error.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

/// Configuration for the volatile cache tier.
///
/// ```rust
/// # use doorman::VolatileCacheConfig;
/// # use std::time::Duration;
/// let config = VolatileCacheConfig::new()
///     .max_entries(1_000)
///     .default_ttl(Duration::from_secs(900));
/// ```
#[derive(Debug, Clone)]
pub struct VolatileCacheConfig {
    /// Maximum number of entries. Default: 500.
    pub max_entries: usize,
    /// TTL applied when `set` is called without one. Default: 1 hour.
    pub default_ttl: Duration,
    /// Interval between proactive sweeps of expired entries.
    /// Default: 5 minutes.
    pub sweep_interval: Duration,
}

impl Default for VolatileCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 500,
            default_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl VolatileCacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the TTL used when `set` receives none.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the interval between proactive sweeps.
    pub fn sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = every;
        self
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
    seq: u64,
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    // Insertion order as (seq, key). A slot whose seq no longer matches
    // the live entry is stale and skipped during eviction.
    order: VecDeque<(u64, String)>,
    next_seq: u64,
}

/// Bounded in-process TTL cache with insertion-order eviction.
///
/// All methods take `&self`; the cache is safe to share behind an [`Arc`].
pub struct VolatileCache<V> {
    inner: Mutex<Inner<V>>,
    config: VolatileCacheConfig,
}

impl<V: Clone> VolatileCache<V> {
    /// Create an empty cache.
    pub fn new(config: VolatileCacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                next_seq: 0,
            }),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry.
    ///
    /// An entry past its `expires_at` is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();
        let expired = match inner.entries.get(key) {
            Some(entry) => {
                if now < entry.expires_at {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            inner.entries.remove(key);
        }
        None
    }

    /// Insert (or overwrite) an entry.
    ///
    /// Without `ttl` the configured default applies. At capacity, the
    /// least-recently-inserted live entry is evicted first; overwriting a
    /// key moves it to the back of the insertion order.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let now = Instant::now();

        let mut inner = self.lock();
        inner.entries.remove(&key);
        while inner.entries.len() >= self.config.max_entries {
            let Some((seq, candidate)) = inner.order.pop_front() else {
                break;
            };
            if inner
                .entries
                .get(&candidate)
                .is_some_and(|entry| entry.seq == seq)
            {
                inner.entries.remove(&candidate);
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.order.push_back((seq, key.clone()));
        inner.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
                seq,
            },
        );
    }

    /// Remove an entry. Returns whether one was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Evict all entries.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Number of entries currently held (live or awaiting lazy expiry).
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry and prune stale insertion-order slots.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        let Inner { entries, order, .. } = &mut *inner;
        entries.retain(|_, entry| now < entry.expires_at);
        order.retain(|(seq, key)| entries.get(key).is_some_and(|entry| entry.seq == *seq));
        before - entries.len()
    }
}

impl<V: Clone + Send + 'static> VolatileCache<V> {
    /// Drive [`sweep`](Self::sweep) on the configured interval.
    ///
    /// The task holds only a `Weak` reference and exits on its own once
    /// the cache is dropped; abort the returned handle to stop it sooner
    /// (e.g. on shutdown).
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        let every = self.config.sweep_interval;
        let weak = Arc::downgrade(&self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(cache) = weak.upgrade() else { break };
                let removed = cache.sweep();
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        })
    }
}

impl<V: Clone> Default for VolatileCache<V> {
    fn default() -> Self {
        Self::new(VolatileCacheConfig::default())
    }
}
