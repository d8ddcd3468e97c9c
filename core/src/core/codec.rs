// memochain/src/core/codec.rs

//! Byte encoding of cached step results.
//!
//! Entries may be written by one process and read by another, so the format
//! is plain JSON of the `Value` enum rather than anything in-memory.

use crate::core::value::Value;

pub fn encode(value: &Value) -> serde_json::Result<Vec<u8>> {
  serde_json::to_vec(value)
}

pub fn decode(bytes: &[u8]) -> serde_json::Result<Value> {
  serde_json::from_slice(bytes)
}
