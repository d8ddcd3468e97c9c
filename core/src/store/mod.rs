// memochain/src/store/mod.rs

//! The cache store port consumed by the resolver, plus an in-process
//! reference implementation.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::CacheStoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value backend holding encoded step results keyed by step hash.
///
/// Implementations must be safe to share between concurrent resolutions and
/// between processes; the engine only ever replaces whole entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
  /// Returns the payload stored under `hash`, or `None` if absent or expired.
  async fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, CacheStoreError>;

  /// Stores `payload` under `hash`. `ttl = None` means the store's own default.
  async fn set(&self, hash: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheStoreError>;
}
