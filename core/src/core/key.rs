// memochain/src/core/key.rs

//! Content-addressed key derivation.
//!
//! A step's key is the previous step's key, the step's function id and its
//! canonically serialized arguments, joined with `_`. The cache is addressed by
//! the SHA-256 of that key, so two chains built independently from the same
//! step sequence land on the same entries.

use crate::core::value::Value;
use crate::error::{ChainError, ChainResult};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Cumulative key of one step and its fixed-length digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedKey {
  pub key: String,
  pub hash: String,
}

/// Derives the key and hash of a step chained off `previous_key`.
///
/// An empty `previous_key` marks the first step of a chain.
pub fn derive(previous_key: &str, function_id: &str, arguments: &[Value]) -> ChainResult<DerivedKey> {
  let serialized = stable_serialize(function_id, arguments)?;

  let mut key = String::with_capacity(previous_key.len() + function_id.len() + serialized.len() + 2);
  if !previous_key.is_empty() {
    key.push_str(previous_key);
    key.push('_');
  }
  key.push_str(function_id);
  key.push('_');
  key.push_str(&serialized);

  let hash = digest(&key);
  Ok(DerivedKey { key, hash })
}

/// Hex SHA-256 of `key`.
pub fn digest(key: &str) -> String {
  hex::encode(Sha256::digest(key.as_bytes()))
}

/// Canonical JSON of the argument list: record keys sorted, no whitespace,
/// integers and floats kept apart by their variant tag. `-0.0` is written as
/// `0.0` since the two compare equal.
pub fn stable_serialize(function_id: &str, arguments: &[Value]) -> ChainResult<String> {
  for (idx, arg) in arguments.iter().enumerate() {
    if let Some(path) = arg.find_non_finite() {
      return Err(ChainError::Argument {
        function_id: function_id.to_string(),
        message: format!("argument {}{} is a non-finite float", idx, path),
      });
    }
  }

  let json = serde_json::to_value(arguments).map_err(|e| ChainError::Argument {
    function_id: function_id.to_string(),
    message: e.to_string(),
  })?;

  let mut out = String::new();
  write_canonical(&json, &mut out).map_err(|e| ChainError::Internal(format!("canonical write failed: {}", e)))?;
  Ok(out)
}

fn write_canonical(value: &serde_json::Value, out: &mut String) -> std::fmt::Result {
  use serde_json::Value as Json;
  match value {
    Json::Null => out.write_str("null"),
    Json::Bool(b) => write!(out, "{}", b),
    Json::Number(n) if n.is_f64() && n.as_f64() == Some(0.0) => out.write_str("0.0"),
    Json::Number(n) => write!(out, "{}", n),
    Json::String(s) => write_json_string(s, out),
    Json::Array(items) => {
      out.write_char('[')?;
      for (i, item) in items.iter().enumerate() {
        if i > 0 {
          out.write_char(',')?;
        }
        write_canonical(item, out)?;
      }
      out.write_char(']')
    }
    Json::Object(map) => {
      // serde_json may preserve insertion order depending on features; sort explicitly.
      let mut entries: Vec<(&String, &Json)> = map.iter().collect();
      entries.sort_by(|a, b| a.0.cmp(b.0));
      out.write_char('{')?;
      for (i, (k, v)) in entries.into_iter().enumerate() {
        if i > 0 {
          out.write_char(',')?;
        }
        write_json_string(k, out)?;
        out.write_char(':')?;
        write_canonical(v, out)?;
      }
      out.write_char('}')
    }
  }
}

fn write_json_string(s: &str, out: &mut String) -> std::fmt::Result {
  // Serializing a str into JSON cannot fail.
  match serde_json::to_string(s) {
    Ok(quoted) => out.write_str(&quoted),
    Err(_) => Err(std::fmt::Error),
  }
}
