// memochain/src/engine.rs

//! Defines the `Engine`, the handle that ties a step catalog to a cache store
//! and hands out chains.
//!
//! The store is injected rather than global, so tests can use doubles and
//! tenants can be isolated by giving each its own engine.

use crate::catalog::StepCatalog;
use crate::config::EngineConfig;
use crate::core::command::CommandRecord;
use crate::pipeline::definition::Chain;
use crate::pipeline::execution::Resolver;
use crate::store::{CacheStore, MemoryStore};
use std::sync::Arc;
use tracing::{event, Level};

/// Cheap-to-clone entry point: every clone shares the same catalog and store.
#[derive(Clone)]
pub struct Engine {
  catalog: Arc<StepCatalog>,
  store: Arc<dyn CacheStore>,
  config: EngineConfig,
}

impl Engine {
  pub fn new(catalog: Arc<StepCatalog>, store: Arc<dyn CacheStore>) -> Self {
    Self::with_config(catalog, store, EngineConfig::default())
  }

  pub fn with_config(catalog: Arc<StepCatalog>, store: Arc<dyn CacheStore>, config: EngineConfig) -> Self {
    event!(
      Level::DEBUG,
      registered_steps = catalog.len(),
      default_ttl = ?config.default_ttl,
      "Engine created."
    );
    Self { catalog, store, config }
  }

  /// Engine backed by a fresh `MemoryStore` shaped by `config`.
  pub fn in_memory(catalog: Arc<StepCatalog>, config: EngineConfig) -> Self {
    let mut store = MemoryStore::new();
    if let Some(ttl) = config.default_ttl {
      store = store.with_default_ttl(ttl);
    }
    if let Some(capacity) = config.memory_capacity {
      store = store.with_capacity(capacity);
    }
    Self::with_config(catalog, Arc::new(store), config)
  }

  pub fn catalog(&self) -> &Arc<StepCatalog> {
    &self.catalog
  }

  pub fn store(&self) -> &Arc<dyn CacheStore> {
    &self.store
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// A new, empty chain.
  pub fn chain(&self) -> Chain {
    Chain::new(self.clone(), &[])
  }

  /// A new chain pre-seeded with a copy of `commands`.
  pub fn chain_from(&self, commands: &[CommandRecord]) -> Chain {
    Chain::new(self.clone(), commands)
  }

  pub fn resolver(&self) -> Resolver {
    Resolver::new(Arc::clone(&self.store), self.config.default_ttl)
  }
}

impl std::fmt::Debug for Engine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Engine")
      .field("registered_steps", &self.catalog.function_ids())
      .field("config", &self.config)
      .finish()
  }
}
