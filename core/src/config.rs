// memochain/src/config.rs

use crate::error::{ChainError, ChainResult};
use std::env;
use std::time::Duration;

pub const DEFAULT_TTL_ENV: &str = "MEMOCHAIN_DEFAULT_TTL_SECS";
pub const MEMORY_CAPACITY_ENV: &str = "MEMOCHAIN_MEMORY_CAPACITY";

/// Engine-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
  /// Expiry passed with every cache write. `None` defers to the store.
  pub default_ttl: Option<Duration>,
  /// Entry bound for the in-memory store built by `Engine::in_memory`.
  pub memory_capacity: Option<usize>,
}

impl EngineConfig {
  pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
    self.default_ttl = Some(ttl);
    self
  }

  pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
    self.memory_capacity = Some(capacity);
    self
  }

  /// Reads `MEMOCHAIN_DEFAULT_TTL_SECS` and `MEMOCHAIN_MEMORY_CAPACITY`.
  /// Unset variables keep the defaults; unparsable ones are an error.
  pub fn from_env() -> ChainResult<Self> {
    let default_ttl = read_env::<u64>(DEFAULT_TTL_ENV)?.map(Duration::from_secs);
    let memory_capacity = read_env::<usize>(MEMORY_CAPACITY_ENV)?;

    tracing::debug!(?default_ttl, ?memory_capacity, "Engine configuration loaded.");
    Ok(Self {
      default_ttl,
      memory_capacity,
    })
  }
}

fn read_env<T>(var_name: &str) -> ChainResult<Option<T>>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) if raw.trim().is_empty() => Ok(None),
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map(Some)
      .map_err(|e| ChainError::Internal(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(env::VarError::NotPresent) => Ok(None),
    Err(e) => Err(ChainError::Internal(format!("Unreadable {}: {}", var_name, e))),
  }
}
