// tests/config_tests.rs
mod common;

use common::*;
use memochain::config::{DEFAULT_TTL_ENV, MEMORY_CAPACITY_ENV};
use memochain::{ChainError, EngineConfig};
use serial_test::serial;
use std::time::Duration;

fn clear_env() {
  std::env::remove_var(DEFAULT_TTL_ENV);
  std::env::remove_var(MEMORY_CAPACITY_ENV);
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
  setup_tracing();
  clear_env();
  assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());
}

#[test]
#[serial]
fn test_from_env_reads_values() {
  setup_tracing();
  clear_env();
  std::env::set_var(DEFAULT_TTL_ENV, "90");
  std::env::set_var(MEMORY_CAPACITY_ENV, " 512 ");

  let config = EngineConfig::from_env().unwrap();
  assert_eq!(config.default_ttl, Some(Duration::from_secs(90)));
  assert_eq!(config.memory_capacity, Some(512));
  clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
  setup_tracing();
  clear_env();
  std::env::set_var(DEFAULT_TTL_ENV, "soon");

  let err = EngineConfig::from_env().unwrap_err();
  match err {
    ChainError::Internal(msg) => assert!(msg.contains(DEFAULT_TTL_ENV), "unexpected message: {}", msg),
    other => panic!("Expected ChainError::Internal, got {:?}", other),
  }
  clear_env();
}

#[test]
fn test_builder_setters() {
  let config = EngineConfig::default()
    .with_default_ttl(Duration::from_secs(5))
    .with_memory_capacity(3);
  assert_eq!(config.default_ttl, Some(Duration::from_secs(5)));
  assert_eq!(config.memory_capacity, Some(3));
}
