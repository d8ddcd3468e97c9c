// memochain/src/pipeline/definition.rs

//! Contains the `Chain` struct, the deferred computation built step by step,
//! and its builder methods. Resolution lives in `execution.rs`.

use crate::catalog::StepDescriptor;
use crate::core::command::CommandRecord;
use crate::core::value::{Arguments, Value};
use crate::engine::Engine;
use crate::error::{ChainError, ChainResult};
use std::sync::Arc;
use tracing::{event, Level};

/// An ordered, append-only sequence of command records plus the running key.
///
/// A chain does nothing until it is resolved, either explicitly via
/// `resolve()` or implicitly when a terminal step is added.
#[derive(Clone)]
pub struct Chain {
  pub(crate) engine: Engine,
  pub(crate) commands: Vec<CommandRecord>,
  running_key: String,
}

/// What `Chain::add_step` hands back.
#[derive(Debug)]
pub enum StepOutcome {
  /// The step was not terminal; keep chaining.
  Pending(Chain),
  /// The step was terminal; the chain has been resolved.
  Resolved(Value),
}

impl StepOutcome {
  pub fn is_resolved(&self) -> bool {
    matches!(self, StepOutcome::Resolved(_))
  }

  pub fn into_chain(self) -> Option<Chain> {
    match self {
      StepOutcome::Pending(chain) => Some(chain),
      StepOutcome::Resolved(_) => None,
    }
  }

  pub fn into_value(self) -> Option<Value> {
    match self {
      StepOutcome::Resolved(value) => Some(value),
      StepOutcome::Pending(_) => None,
    }
  }
}

impl Chain {
  /// Creates a chain seeded with `commands`. The records are copied; the new
  /// chain never shares its sequence with anyone.
  pub(crate) fn new(engine: Engine, commands: &[CommandRecord]) -> Self {
    let commands = commands.to_vec();
    let running_key = commands.last().map(|c| c.key().to_string()).unwrap_or_default();
    Self {
      engine,
      commands,
      running_key,
    }
  }

  /// Copies this chain so a shared prefix can be extended in another direction.
  pub fn fork(&self) -> Chain {
    Chain::new(self.engine.clone(), &self.commands)
  }

  /// Appends a step, deriving its key from the current running key.
  ///
  /// Fails before touching the cache if the step is unknown, the argument
  /// count breaks its arity, or an argument cannot be serialized stably.
  pub fn append(&mut self, function_id: &str, arguments: Arguments) -> ChainResult<&CommandRecord> {
    let step = self.engine.catalog().lookup(function_id)?;
    self.push(step, arguments)
  }

  fn push(&mut self, step: Arc<StepDescriptor>, arguments: Arguments) -> ChainResult<&CommandRecord> {
    let record = CommandRecord::new(step, arguments, &self.running_key)?;
    event!(
      Level::TRACE,
      function_id = record.function_id(),
      step_index = self.commands.len(),
      hash = record.hash(),
      "Step appended."
    );
    self.running_key = record.key().to_string();
    self.commands.push(record);
    // Just pushed, so `last` is always present.
    self
      .commands
      .last()
      .ok_or_else(|| ChainError::Internal("command sequence empty after push".to_string()))
  }

  /// Appends a step and, if it is terminal, resolves the chain right away.
  pub async fn add_step(mut self, function_id: &str, arguments: Arguments) -> ChainResult<StepOutcome> {
    let is_terminal = self.append(function_id, arguments)?.is_terminal();
    if is_terminal {
      let value = self.resolve().await?;
      return Ok(StepOutcome::Resolved(value));
    }
    Ok(StepOutcome::Pending(self))
  }

  /// Appends a non-terminal step and returns the chain for further building.
  pub fn then(mut self, function_id: &str, arguments: Arguments) -> ChainResult<Chain> {
    let step = self.engine.catalog().lookup(function_id)?;
    if step.is_terminal() {
      return Err(ChainError::TerminalStep {
        function_id: function_id.to_string(),
      });
    }
    self.push(step, arguments)?;
    Ok(self)
  }

  /// Appends a step (terminal or not) and resolves the chain.
  pub async fn finish(mut self, function_id: &str, arguments: Arguments) -> ChainResult<Value> {
    self.append(function_id, arguments)?;
    self.resolve().await
  }

  pub fn commands(&self) -> &[CommandRecord] {
    &self.commands
  }

  /// Key of the last appended step, or `""` for an empty chain.
  pub fn running_key(&self) -> &str {
    &self.running_key
  }

  pub fn hashes(&self) -> Vec<&str> {
    self.commands.iter().map(|c| c.hash()).collect()
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }
}

impl std::fmt::Debug for Chain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Chain")
      .field("commands", &self.commands)
      .field("running_key", &self.running_key)
      .finish()
  }
}
