// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use memochain::{
  sync_step, Arity, CacheStore, CacheStoreError, Engine, EngineConfig, MemoryStore, StepCall, StepCatalog, Table,
  Value,
};
use std::collections::HashMap;
use std::sync::{
  atomic::{AtomicBool, AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;

// --- Call counters, one per step id ---
#[derive(Clone, Default)]
pub struct StepCounters {
  counters: Arc<parking_lot::Mutex<HashMap<String, Arc<AtomicUsize>>>>,
}

impl StepCounters {
  pub fn handle(&self, function_id: &str) -> Arc<AtomicUsize> {
    Arc::clone(
      self
        .counters
        .lock()
        .entry(function_id.to_string())
        .or_insert_with(|| Arc::new(AtomicUsize::new(0))),
    )
  }

  pub fn calls(&self, function_id: &str) -> usize {
    self.handle(function_id).load(Ordering::SeqCst)
  }

  pub fn total(&self) -> usize {
    self.counters.lock().values().map(|c| c.load(Ordering::SeqCst)).sum()
  }

  pub fn reset(&self) {
    for c in self.counters.lock().values() {
      c.store(0, Ordering::SeqCst);
    }
  }
}

fn ints(value: &Option<Value>) -> anyhow::Result<Vec<i64>> {
  let list = value
    .as_ref()
    .and_then(Value::as_list)
    .ok_or_else(|| anyhow::anyhow!("expected a list from the previous step"))?;
  list
    .iter()
    .map(|v| v.as_int().ok_or_else(|| anyhow::anyhow!("expected integers, got {:?}", v)))
    .collect()
}

fn text_arg(call: &StepCall, idx: usize) -> anyhow::Result<String> {
  call
    .arguments
    .get(idx)
    .and_then(Value::as_str)
    .map(str::to_string)
    .ok_or_else(|| anyhow::anyhow!("argument {} must be text", idx))
}

/// Sample catalog used across tests.
///
/// - `load(source)`: root; "X" -> [1,2,3], "Y" -> [10,20], anything else fails.
/// - `filter_gt(n)`: chained; keeps items > n.
/// - `double()`: chained; multiplies every item by 2.
/// - `gate()`: chained; passes input through, fails while the gate is closed.
/// - `sum()`, `count()`: terminal.
/// - `load_credits(bridge)`: root; a small credits table.
/// - `where_eq(column, value)`: chained; table row filter.
/// - `sum_column(column)`: terminal; integer column total.
pub struct Fixture {
  pub catalog: Arc<StepCatalog>,
  pub counters: StepCounters,
  pub gate_open: Arc<AtomicBool>,
}

impl Fixture {
  pub fn new() -> Self {
    let catalog = StepCatalog::new();
    let counters = StepCounters::default();
    let gate_open = Arc::new(AtomicBool::new(true));

    let c = counters.handle("load");
    catalog
      .root(
        "load",
        Arity::Exact(1),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          match text_arg(&call, 0)?.as_str() {
            "X" => Ok(Value::from(vec![1i64, 2, 3])),
            "Y" => Ok(Value::from(vec![10i64, 20])),
            other => anyhow::bail!("unknown source '{}'", other),
          }
        }),
      )
      .unwrap();

    let c = counters.handle("filter_gt");
    catalog
      .chained(
        "filter_gt",
        Arity::Exact(1),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          let threshold = call.arguments[0]
            .as_int()
            .ok_or_else(|| anyhow::anyhow!("threshold must be an integer"))?;
          let kept: Vec<i64> = ints(&call.previous)?.into_iter().filter(|v| *v > threshold).collect();
          Ok(Value::from(kept))
        }),
      )
      .unwrap();

    let c = counters.handle("double");
    catalog
      .chained(
        "double",
        Arity::Exact(0),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          let doubled: Vec<i64> = ints(&call.previous)?.into_iter().map(|v| v * 2).collect();
          Ok(Value::from(doubled))
        }),
      )
      .unwrap();

    let c = counters.handle("gate");
    let open = Arc::clone(&gate_open);
    catalog
      .chained("gate", Arity::Exact(0), move |call: StepCall| {
        let c = Arc::clone(&c);
        let open = Arc::clone(&open);
        async move {
          c.fetch_add(1, Ordering::SeqCst);
          tokio::time::sleep(Duration::from_millis(1)).await;
          if !open.load(Ordering::SeqCst) {
            anyhow::bail!("gate is closed");
          }
          Ok(call.previous.unwrap_or(Value::Null))
        }
      })
      .unwrap();

    let c = counters.handle("sum");
    catalog
      .terminal(
        "sum",
        Arity::Exact(0),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          Ok(Value::Int(ints(&call.previous)?.into_iter().sum()))
        }),
      )
      .unwrap();

    let c = counters.handle("count");
    catalog
      .terminal(
        "count",
        Arity::Exact(0),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          Ok(Value::Int(ints(&call.previous)?.len() as i64))
        }),
      )
      .unwrap();

    let c = counters.handle("load_credits");
    catalog
      .root(
        "load_credits",
        Arity::Exact(1),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          let bridge = text_arg(&call, 0)?;
          let mut table = Table::new(["bridge", "pool", "quantity"]);
          table.push_row(vec![bridge.clone().into(), "BCT".into(), 100i64.into()])?;
          table.push_row(vec![bridge.clone().into(), "NCT".into(), 40i64.into()])?;
          table.push_row(vec![bridge.into(), "BCT".into(), 7i64.into()])?;
          Ok(Value::Table(table))
        }),
      )
      .unwrap();

    let c = counters.handle("where_eq");
    catalog
      .chained(
        "where_eq",
        Arity::Exact(2),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          let column = text_arg(&call, 0)?;
          let wanted = call.arguments[1].clone();
          let table = call
            .previous
            .as_ref()
            .and_then(Value::as_table)
            .ok_or_else(|| anyhow::anyhow!("where_eq needs a table"))?;
          let idx = table
            .column_index(&column)
            .ok_or_else(|| anyhow::anyhow!("no column '{}'", column))?;
          Ok(Value::Table(table.filter_rows(|row| row[idx] == wanted)))
        }),
      )
      .unwrap();

    let c = counters.handle("sum_column");
    catalog
      .terminal(
        "sum_column",
        Arity::Exact(1),
        sync_step(move |call| {
          c.fetch_add(1, Ordering::SeqCst);
          let column = text_arg(&call, 0)?;
          let table = call
            .previous
            .as_ref()
            .and_then(Value::as_table)
            .ok_or_else(|| anyhow::anyhow!("sum_column needs a table"))?;
          let cells = table
            .column(&column)
            .ok_or_else(|| anyhow::anyhow!("no column '{}'", column))?;
          Ok(Value::Int(cells.iter().filter_map(|v| v.as_int()).sum()))
        }),
      )
      .unwrap();

    Self {
      catalog: Arc::new(catalog),
      counters,
      gate_open,
    }
  }

  pub fn engine_with(&self, store: Arc<dyn CacheStore>) -> Engine {
    Engine::new(Arc::clone(&self.catalog), store)
  }

  pub fn memory_engine(&self) -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (self.engine_with(store.clone()), store)
  }

  pub fn engine_with_config(&self, config: EngineConfig) -> Engine {
    Engine::in_memory(Arc::clone(&self.catalog), config)
  }

  pub fn close_gate(&self) {
    self.gate_open.store(false, Ordering::SeqCst);
  }

  pub fn open_gate(&self) {
    self.gate_open.store(true, Ordering::SeqCst);
  }
}

// --- A cache store double whose reads and writes can be made to fail ---
#[derive(Default)]
pub struct FlakyStore {
  pub inner: MemoryStore,
  pub fail_reads: AtomicBool,
  pub fail_writes: AtomicBool,
  pub reads: AtomicUsize,
  pub writes: AtomicUsize,
  pub last_ttl: parking_lot::Mutex<Option<Option<Duration>>>,
}

impl FlakyStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CacheStore for FlakyStore {
  async fn get(&self, hash: &str) -> Result<Option<Vec<u8>>, CacheStoreError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(CacheStoreError::Unavailable("read refused".to_string()));
    }
    self.inner.get(hash).await
  }

  async fn set(&self, hash: &str, payload: Vec<u8>, ttl: Option<Duration>) -> Result<(), CacheStoreError> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    *self.last_ttl.lock() = Some(ttl);
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(anyhow::anyhow!("write refused").into());
    }
    self.inner.set(hash, payload, ttl).await
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn x_list() -> Value {
  Value::from(vec![1i64, 2, 3])
}
