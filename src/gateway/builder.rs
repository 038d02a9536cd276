//! Builder for configuring gateway instances

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::EmbeddedGateway;
use crate::cache::{DurableCacheConfig, DurableStore, VolatileCacheConfig};
use crate::queue::QueueConfig;
use crate::{DoormanError, Result};

/// Main entry point for creating gateway instances.
pub struct Doorman;

impl Doorman {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> DoormanBuilder {
        DoormanBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// The durable store is the only required dependency; everything else
/// defaults to a small deployment (3 concurrent jobs, 500 volatile
/// entries, 24-hour durable TTL).
pub struct DoormanBuilder {
    queue: QueueConfig,
    volatile: VolatileCacheConfig,
    durable: DurableCacheConfig,
    store: Option<Arc<dyn DurableStore>>,
}

impl DoormanBuilder {
    pub fn new() -> Self {
        Self {
            queue: QueueConfig::default(),
            volatile: VolatileCacheConfig::default(),
            durable: DurableCacheConfig::default(),
            store: None,
        }
    }

    /// Configure the job queue (concurrency ceiling, token bucket,
    /// wait-estimate fallback).
    pub fn queue(mut self, config: QueueConfig) -> Self {
        self.queue = config;
        self
    }

    /// Configure the volatile cache tier.
    pub fn volatile_cache(mut self, config: VolatileCacheConfig) -> Self {
        self.volatile = config;
        self
    }

    /// Configure the durable cache tier.
    pub fn durable_cache(mut self, config: DurableCacheConfig) -> Self {
        self.durable = config;
        self
    }

    /// Inject the durable store backing the slow cache tier. Required.
    pub fn durable_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// [`DoormanError::Configuration`] when no durable store was
    /// provided.
    ///
    /// # Panics
    ///
    /// Requires a tokio runtime context (the refill ticker and cache
    /// sweeper are spawned here).
    pub fn build<T>(self) -> Result<EmbeddedGateway<T>>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let store = self.store.ok_or_else(|| {
            DoormanError::Configuration("no durable store configured".to_string())
        })?;
        Ok(EmbeddedGateway::new(
            self.queue,
            self.volatile,
            self.durable,
            store,
        ))
    }
}

impl Default for DoormanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
