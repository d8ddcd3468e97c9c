// memochain/src/pipeline/execution.rs

//! Contains the `Resolver`, which executes a chain by resuming from its deepest
//! cached step and replaying only the uncached suffix.

use crate::catalog::StepCall;
use crate::core::codec;
use crate::core::command::CommandRecord;
use crate::core::value::Value;
use crate::error::{ChainError, ChainResult};
use crate::pipeline::definition::Chain;
use crate::store::CacheStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, instrument, Level};

/// Result of a resolution, with enough bookkeeping to see what was reused.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub value: Value,
  /// Index of the deepest step served from the cache, if any.
  pub resumed_from: Option<usize>,
  /// Number of step functions actually invoked.
  pub computed: usize,
}

/// Walks a command sequence against a cache store.
#[derive(Clone)]
pub struct Resolver {
  store: Arc<dyn CacheStore>,
  ttl: Option<Duration>,
}

impl Resolver {
  pub fn new(store: Arc<dyn CacheStore>, ttl: Option<Duration>) -> Self {
    Self { store, ttl }
  }

  /// Resolves `commands`:
  /// 1. scan backward for the deepest step whose hash is cached;
  /// 2. replay every later step forward, writing each result back.
  ///
  /// A failing step aborts the run with `ChainError::StepExecution`; nothing
  /// from that step onward is written. Cache store failures never abort.
  #[instrument(name = "Resolver::resolve", skip_all, fields(num_steps = commands.len()), err(Display))]
  pub async fn resolve(&self, commands: &[CommandRecord]) -> ChainResult<Resolution> {
    if commands.is_empty() {
      return Err(ChainError::EmptyPipeline);
    }
    event!(Level::DEBUG, "Resolution starting.");

    let (start, mut running, resumed_from) = match self.find_deepest_cached(commands).await {
      Some((idx, value)) => (idx + 1, Some(value), Some(idx)),
      None => (0, None, None),
    };

    let mut computed = 0;
    for (step_index, command) in commands.iter().enumerate().skip(start) {
      let function_id = command.function_id();
      let previous = if command.takes_input() { running.take() } else { None };
      let call = StepCall {
        function_id: function_id.to_string(),
        previous,
        arguments: command.arguments().to_vec(),
      };

      event!(Level::TRACE, %function_id, step_index, "Invoking step.");
      let value = (command.step.func)(call).await.map_err(|source| {
        event!(Level::ERROR, %function_id, step_index, error = %source, "Step failed.");
        ChainError::StepExecution {
          function_id: function_id.to_string(),
          step_index,
          source,
        }
      })?;
      computed += 1;

      self.write_back(step_index, command, &value).await;
      running = Some(value);
    }

    let value = running.ok_or_else(|| ChainError::Internal("resolution produced no value".to_string()))?;
    event!(Level::DEBUG, ?resumed_from, computed, "Resolution completed.");
    Ok(Resolution {
      value,
      resumed_from,
      computed,
    })
  }

  /// Deepest (most recent) cached step and its value. Unreachable or
  /// undecodable entries count as misses.
  async fn find_deepest_cached(&self, commands: &[CommandRecord]) -> Option<(usize, Value)> {
    for (idx, command) in commands.iter().enumerate().rev() {
      let hash = command.hash();
      match self.store.get(hash).await {
        Ok(Some(bytes)) => match codec::decode(&bytes) {
          Ok(value) => {
            event!(Level::DEBUG, step_index = idx, function_id = command.function_id(), %hash, "Cache hit.");
            return Some((idx, value));
          }
          Err(e) => {
            event!(Level::WARN, step_index = idx, %hash, error = %e, "Undecodable cache entry, treating as miss.");
          }
        },
        Ok(None) => {
          event!(Level::TRACE, step_index = idx, %hash, "Cache miss.");
        }
        Err(e) => {
          event!(Level::WARN, step_index = idx, %hash, error = %e, "Cache store read failed, treating as miss.");
        }
      }
    }
    None
  }

  /// Best-effort write of a step result; failures only cost a future recompute.
  async fn write_back(&self, step_index: usize, command: &CommandRecord, value: &Value) {
    let hash = command.hash();
    if let Some(path) = value.find_non_finite() {
      event!(Level::WARN, step_index, %hash, %path, "Result holds a non-finite float, not caching.");
      return;
    }
    let payload = match codec::encode(value) {
      Ok(bytes) => bytes,
      Err(e) => {
        event!(Level::WARN, step_index, %hash, error = %e, "Result encoding failed, not caching.");
        return;
      }
    };
    if let Err(e) = self.store.set(hash, payload, self.ttl).await {
      event!(Level::WARN, step_index, %hash, error = %e, "Cache store write failed.");
    }
  }
}

impl Chain {
  /// Resolves this chain and returns its final value.
  pub async fn resolve(&self) -> ChainResult<Value> {
    Ok(self.resolve_with_report().await?.value)
  }

  /// Resolves this chain and reports which steps were reused.
  pub async fn resolve_with_report(&self) -> ChainResult<Resolution> {
    self.engine.resolver().resolve(&self.commands).await
  }
}
