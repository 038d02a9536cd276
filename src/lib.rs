//! Doorman - admission-controlled gateway core for metered APIs
//!
//! Fronts expensive, externally-metered calls (LLM completions, paid
//! property-data lookups) with three cooperating pieces:
//!
//! - a [`PriorityJobQueue`] bounding concurrent outbound calls, admitting
//!   paid-tier jobs ahead of free-tier ones (strict FIFO within a tier),
//! - a token-bucket [`RateLimiter`] shared across all callers,
//! - a [`TieredCache`] — a fast volatile tier over a durable external
//!   store — letting repeated requests skip the queue entirely.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doorman::{CacheKey, Doorman, DurableStore, Tier};
//!
//! #[derive(Clone, serde::Serialize, serde::Deserialize)]
//! struct Analysis {
//!     summary: String,
//! }
//!
//! # async fn fetch_analysis(address: String) -> doorman::Result<Analysis> { unimplemented!() }
//! # fn redis_store() -> Arc<dyn DurableStore> { unimplemented!() }
//! #[tokio::main]
//! async fn main() -> doorman::Result<()> {
//!     let gateway = Doorman::builder()
//!         .durable_store(redis_store())
//!         .build::<Analysis>()?;
//!
//!     let address = "123 Main St".to_string();
//!     let key = CacheKey::new("property_analysis", &[("address", &address)]);
//!     let report = gateway
//!         .request("session-42", Tier::Paid, &key, move || fetch_analysis(address))
//!         .await?;
//!
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```
//!
//! # Backpressure
//!
//! The queue is unbounded by design: admission control is
//! throughput-based (concurrency ceiling plus token bucket), not
//! rejection-based. Callers observe load through
//! [`EmbeddedGateway::position`] and
//! [`EmbeddedGateway::estimated_wait_seconds`] rather than errors.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod queue;
pub mod telemetry;

// Re-export main types at crate root
pub use error::{DoormanError, Result};
pub use gateway::{Doorman, DoormanBuilder, EmbeddedGateway};

// Re-export cache types
pub use cache::{
    CacheKey, DurableCacheAdapter, DurableCacheConfig, DurableStore, StoreError, TieredCache,
    VolatileCache, VolatileCacheConfig,
};

// Re-export queue types
pub use queue::{
    JobHandle, PriorityJobQueue, QueueConfig, QueueStats, QueueStatsTracker, RateLimiter,
    RateLimiterConfig, Tier,
};
