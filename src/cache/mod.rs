//! Caching subsystem.
//!
//! Two tiers composed by [`TieredCache`]:
//!
//! - [`VolatileCache`] — in-process, bounded, TTL with insertion-order
//!   eviction. Models hot repeats within a session.
//!
//! - [`DurableCacheAdapter`] — fail-open adapter over an external
//!   [`DurableStore`] capability. Models slowly-changing facts with a
//!   longer TTL; any store failure degrades to a miss.
//!
//! Keys come from [`CacheKey`], which is stable across processes so both
//! tiers share one key space. A hit in either tier means the expensive
//! upstream call is skipped entirely.

pub mod durable;
pub mod key;
pub mod tiered;
pub mod volatile;

pub use durable::{DurableCacheAdapter, DurableCacheConfig, DurableStore, StoreError};
pub use key::CacheKey;
pub use tiered::TieredCache;
pub use volatile::{VolatileCache, VolatileCacheConfig};
