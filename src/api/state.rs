//! Application state for the billing API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::config::ConfigLoader;
use crate::engine::BillingEngine;
use crate::error::EngineResult;
use crate::store::MemoryStore;

/// Shared application state.
///
/// Holds the store behind a read-write lock, so reports run concurrently
/// while writes are serialized, plus the engine that computes over it.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<MemoryStore>>,
    engine: Arc<BillingEngine>,
}

impl AppState {
    /// Creates a new application state over an existing store.
    pub fn new(store: MemoryStore, engine: BillingEngine) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            engine: Arc::new(engine),
        }
    }

    /// Seeds a fresh store from `config` and builds an engine that pays the
    /// configured default rate.
    pub fn from_config(config: &ConfigLoader, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        let mut store = MemoryStore::new();
        config.seed(&mut store)?;
        let engine = BillingEngine::new(clock).with_default_rate(config.default_session_rate());
        Ok(Self::new(store, engine))
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<RwLock<MemoryStore>> {
        &self.store
    }

    /// Returns the billing engine.
    pub fn engine(&self) -> &BillingEngine {
        &self.engine
    }
}
