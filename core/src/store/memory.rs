// memochain/src/store/memory.rs

//! `MemoryStore`: a process-local `CacheStore` with expiry and bounded size.

use crate::error::CacheStoreError;
use crate::store::CacheStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{event, Level};

#[derive(Debug)]
struct Entry {
  payload: Vec<u8>,
  expires_at: Option<Instant>,
  seq: u64,
}

impl Entry {
  fn is_expired(&self, now: Instant) -> bool {
    self.expires_at.map_or(false, |at| now >= at)
  }
}

#[derive(Debug, Default)]
struct Inner {
  entries: HashMap<String, Entry>,
  // Insertion sequence -> hash, oldest first. Drives eviction.
  order: BTreeMap<u64, String>,
  next_seq: u64,
}

impl Inner {
  fn remove(&mut self, hash: &str) -> Option<Entry> {
    let entry = self.entries.remove(hash)?;
    self.order.remove(&entry.seq);
    Some(entry)
  }
}

/// In-memory cache store.
///
/// Entries expire after their ttl (or the store default when the caller passes
/// none). When `capacity` is set, inserting past it evicts the oldest entry.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
  default_ttl: Option<Duration>,
  capacity: Option<usize>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
    self.default_ttl = Some(ttl);
    self
  }

  pub fn with_capacity(mut self, capacity: usize) -> Self {
    self.capacity = Some(capacity);
    self
  }

  /// Number of stored entries, including expired ones not yet purged.
  pub fn len(&self) -> usize {
    self.inner.lock().entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.lock().entries.is_empty()
  }

  /// True if a live (unexpired) entry exists for `hash`.
  pub fn contains(&self, hash: &str) -> bool {
    let now = Instant::now();
    self
      .inner
      .lock()
      .entries
      .get(hash)
      .map_or(false, |e| !e.is_expired(now))
  }

  pub fn remove(&self, hash: &str) -> bool {
    self.inner.lock().remove(hash).is_some()
  }

  pub fn clear(&self) {
    let mut inner = self.inner.lock();
    inner.entries.clear();
    inner.order.clear();
  }

  /// Drops every expired entry and returns how many were removed.
  pub fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut inner = self.inner.lock();
    let expired: Vec<String> = inner
      .entries
      .iter()
      .filter(|(_, e)| e.is_expired(now))
      .map(|(k, _)| k.clone())
      .collect();
    for hash in &expired {
      inner.remove(hash);
    }
    expired.len()
  }
}

#[async_trait]
impl CacheStore for MemoryStore {
  async fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
    let now = Instant::now();
    let mut inner = self.inner.lock();
    match inner.entries.get(hash) {
      None => return Ok(None),
      Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.payload.clone())),
      Some(_) => {}
    }
    inner.remove(hash);
    event!(Level::TRACE, %hash, "Expired entry dropped on read.");
    Ok(None)
  }

  async fn set(&self, hash: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheStoreError> {
    // An expiry past what `Instant` can represent never expires.
    let expires_at = ttl.or(self.default_ttl).and_then(|t| Instant::now().checked_add(t));
    let mut inner = self.inner.lock();
    inner.remove(hash);

    if let Some(capacity) = self.capacity {
      if capacity == 0 {
        return Ok(());
      }
      while inner.entries.len() >= capacity {
        let oldest = match inner.order.iter().next() {
          Some((_, h)) => h.clone(),
          None => break,
        };
        inner.remove(&oldest);
        event!(Level::TRACE, hash = %oldest, "Evicted oldest entry.");
      }
    }

    let seq = inner.next_seq;
    inner.next_seq += 1;
    inner.order.insert(seq, hash.to_string());
    inner.entries.insert(
      hash.to_string(),
      Entry {
        payload,
        expires_at,
        seq,
      },
    );
    Ok(())
  }
}
