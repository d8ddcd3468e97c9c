// memochain/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
  /// Step arguments cannot be turned into a deterministic key, or do not fit
  /// the registered arity. Raised at append time, before any cache traffic.
  #[error("Invalid arguments for step '{function_id}': {message}")]
  Argument { function_id: String, message: String },

  #[error("Step not registered in catalog: {function_id}")]
  UnknownStep { function_id: String },

  #[error("Step registration rejected for '{function_id}': {message}")]
  Registration { function_id: String, message: String },

  /// A step function failed during resolution. The source is the step's own
  /// error, untouched.
  #[error("Step '{function_id}' at index {step_index} failed. Source: {source}")]
  StepExecution {
    function_id: String,
    step_index: usize,
    #[source]
    source: AnyhowError,
  },

  #[error("Cannot resolve a pipeline with no steps")]
  EmptyPipeline,

  #[error("Step '{function_id}' is terminal and cannot be chained further; use finish()")]
  TerminalStep { function_id: String },

  #[error("Internal memochain error: {0}")]
  Internal(String),
}

impl ChainError {
  /// The underlying step failure, if this error came from a step function.
  pub fn step_source(&self) -> Option<&AnyhowError> {
    match self {
      ChainError::StepExecution { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Failures reported by a `CacheStore` backend. The resolver never surfaces
/// these; a failed read is a miss and a failed write is dropped.
#[derive(Debug, Error)]
pub enum CacheStoreError {
  #[error("Cache store unavailable: {0}")]
  Unavailable(String),

  #[error("Cache store backend error. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for CacheStoreError {
  fn from(err: AnyhowError) -> Self {
    CacheStoreError::Backend { source: err }
  }
}

pub type ChainResult<T, E = ChainError> = std::result::Result<T, E>;
