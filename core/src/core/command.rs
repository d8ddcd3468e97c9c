// memochain/src/core/command.rs

//! Defines the `CommandRecord`, the immutable description of one chain step.

use crate::catalog::StepDescriptor;
use crate::core::key;
use crate::core::value::{Arguments, Value};
use crate::error::ChainResult;
use std::sync::Arc;

/// One step of a chain: the function to call, its arguments, and the
/// content-derived key/hash under which its result is cached.
///
/// Records are cheap to clone (the descriptor is shared) so forking a chain
/// copies them by value.
#[derive(Clone)]
pub struct CommandRecord {
  pub(crate) step: Arc<StepDescriptor>,
  arguments: Arguments,
  key: String,
  hash: String,
}

impl CommandRecord {
  /// Builds the record for `step` chained off `previous_key`.
  ///
  /// Fails with `ChainError::Argument` when the arguments break the step's
  /// arity or cannot be serialized deterministically.
  pub(crate) fn new(step: Arc<StepDescriptor>, arguments: Arguments, previous_key: &str) -> ChainResult<Self> {
    step.check_arguments(&arguments)?;
    let derived = key::derive(previous_key, &step.function_id, &arguments)?;
    Ok(Self {
      step,
      arguments,
      key: derived.key,
      hash: derived.hash,
    })
  }

  pub fn function_id(&self) -> &str {
    &self.step.function_id
  }

  pub fn arguments(&self) -> &[Value] {
    &self.arguments
  }

  pub fn takes_input(&self) -> bool {
    self.step.takes_input()
  }

  pub fn is_terminal(&self) -> bool {
    self.step.is_terminal()
  }

  /// Cumulative key including every preceding step.
  pub fn key(&self) -> &str {
    &self.key
  }

  /// Cache store address of this step's result.
  pub fn hash(&self) -> &str {
    &self.hash
  }
}

impl std::fmt::Debug for CommandRecord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CommandRecord")
      .field("function_id", &self.step.function_id)
      .field("arguments", &self.arguments)
      .field("takes_input", &self.takes_input())
      .field("is_terminal", &self.is_terminal())
      .field("hash", &self.hash)
      .finish()
  }
}
