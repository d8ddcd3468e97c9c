// memochain/examples/basic_chain.rs

use memochain::{sync_step, Arity, ChainResult, Engine, EngineConfig, StepCatalog, Value};
use std::sync::Arc;
use tracing::info;

fn numbers(previous: &Option<Value>) -> anyhow::Result<Vec<i64>> {
  previous
    .as_ref()
    .and_then(Value::as_list)
    .ok_or_else(|| anyhow::anyhow!("expected a list"))?
    .iter()
    .map(|v| v.as_int().ok_or_else(|| anyhow::anyhow!("expected an integer")))
    .collect()
}

#[tokio::main]
async fn main() -> ChainResult<()> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

  info!("--- Basic Chain Example ---");

  // 1. Register the steps
  let catalog = StepCatalog::new();
  catalog.root(
    "load",
    Arity::Exact(1),
    sync_step(|call| {
      info!(source = ?call.arguments[0], "load running");
      Ok(Value::from(vec![1i64, 2, 3]))
    }),
  )?;
  catalog.chained(
    "filter_gt",
    Arity::Exact(1),
    sync_step(|call| {
      let threshold = call.arguments[0].as_int().unwrap_or(0);
      info!(threshold, "filter_gt running");
      Ok(Value::from(
        numbers(&call.previous)?.into_iter().filter(|v| *v > threshold).collect::<Vec<_>>(),
      ))
    }),
  )?;
  catalog.terminal(
    "sum",
    Arity::Exact(0),
    sync_step(|call| Ok(Value::Int(numbers(&call.previous)?.into_iter().sum()))),
  )?;
  catalog.terminal(
    "count",
    Arity::Exact(0),
    sync_step(|call| Ok(Value::Int(numbers(&call.previous)?.len() as i64))),
  )?;

  // 2. Build an engine over an in-memory store
  let engine = Engine::in_memory(Arc::new(catalog), EngineConfig::from_env()?);

  // 3. A shared prefix, extended in two directions
  let base = engine
    .chain()
    .then("load", vec![Value::from("X")])?
    .then("filter_gt", vec![Value::Int(1)])?;

  let sum = base.fork().finish("sum", vec![]).await?;
  info!(?sum, "first resolution computed load, filter_gt and sum");

  let report = base.fork().then("filter_gt", vec![Value::Int(2)])?.resolve_with_report().await?;
  info!(
    value = ?report.value,
    resumed_from = ?report.resumed_from,
    computed = report.computed,
    "second resolution resumed from the cached filter"
  );

  let count = base.finish("count", vec![]).await?;
  info!(?count, "count reused the same prefix");

  assert_eq!(sum, Value::Int(5));
  assert_eq!(count, Value::Int(2));
  Ok(())
}
