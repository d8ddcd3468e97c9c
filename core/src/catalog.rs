// memochain/src/catalog.rs

//! Defines the `StepCatalog`, a registration table mapping stable function ids
//! to typed step descriptors.
//!
//! A step's id is part of every content-derived key built on top of it, so ids
//! must stay the same across process restarts. Shape (kind, arity) is checked
//! once at registration and again when a step is appended to a chain, never
//! at resolution time.

use crate::core::value::{Arguments, Value};
use crate::error::{ChainError, ChainResult};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{event, Level};

/// What a step function receives when the resolver invokes it.
#[derive(Debug, Clone)]
pub struct StepCall {
  pub function_id: String,
  /// Result of the preceding step. Always `None` for root steps; may also be
  /// `None` for a chained step placed first, which the step must tolerate or reject.
  pub previous: Option<Value>,
  pub arguments: Arguments,
}

/// Type alias for a registered step function.
///
/// Step functions must be pure with respect to `previous` and `arguments`:
/// the resolver may skip them entirely when their output is already cached.
pub type StepFn =
  Arc<dyn Fn(StepCall) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>> + Send + Sync>;

/// The three canonical step shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
  /// Loads or seeds data; ignores any previous result.
  Root,
  /// Transforms the previous result and stays chainable.
  Chained,
  /// Transforms the previous result and resolves the chain immediately.
  Terminal,
}

impl StepKind {
  pub fn takes_input(self) -> bool {
    !matches!(self, StepKind::Root)
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, StepKind::Terminal)
  }
}

/// Number of arguments a step accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
  Exact(usize),
  Any,
}

impl Arity {
  pub fn accepts(self, count: usize) -> bool {
    match self {
      Arity::Exact(n) => n == count,
      Arity::Any => true,
    }
  }
}

/// A registered step: identity, shape and the function itself.
pub struct StepDescriptor {
  pub function_id: String,
  pub kind: StepKind,
  pub arity: Arity,
  pub(crate) func: StepFn,
}

impl StepDescriptor {
  pub fn new<F, Fut>(function_id: impl Into<String>, kind: StepKind, arity: Arity, step_fn: F) -> Self
  where
    F: Fn(StepCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
  {
    let func: StepFn = Arc::new(
      move |call: StepCall| -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>> { Box::pin(step_fn(call)) },
    );
    Self {
      function_id: function_id.into(),
      kind,
      arity,
      func,
    }
  }

  pub fn takes_input(&self) -> bool {
    self.kind.takes_input()
  }

  pub fn is_terminal(&self) -> bool {
    self.kind.is_terminal()
  }

  pub(crate) fn check_arguments(&self, arguments: &[Value]) -> ChainResult<()> {
    if self.arity.accepts(arguments.len()) {
      return Ok(());
    }
    let expected = match self.arity {
      Arity::Exact(n) => n,
      Arity::Any => arguments.len(),
    };
    Err(ChainError::Argument {
      function_id: self.function_id.clone(),
      message: format!("expected {} argument(s), got {}", expected, arguments.len()),
    })
  }
}

// StepFn (Arc<dyn Fn...>) doesn't implement Debug.
impl std::fmt::Debug for StepDescriptor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDescriptor")
      .field("function_id", &self.function_id)
      .field("kind", &self.kind)
      .field("arity", &self.arity)
      .finish()
  }
}

/// Adapts a synchronous transform into a step function.
pub fn sync_step<F>(f: F) -> impl Fn(StepCall) -> std::future::Ready<anyhow::Result<Value>> + Send + Sync + 'static
where
  F: Fn(StepCall) -> anyhow::Result<Value> + Send + Sync + 'static,
{
  move |call| std::future::ready(f(call))
}

/// The step registration table.
#[derive(Default)]
pub struct StepCatalog {
  steps: RwLock<HashMap<String, Arc<StepDescriptor>>>,
}

impl StepCatalog {
  /// Creates a new, empty catalog.
  pub fn new() -> Self {
    Self {
      steps: RwLock::new(HashMap::new()),
    }
  }

  /// Registers a descriptor. Empty and duplicate ids are rejected.
  pub fn register(&self, descriptor: StepDescriptor) -> ChainResult<()> {
    if descriptor.function_id.trim().is_empty() {
      return Err(ChainError::Registration {
        function_id: descriptor.function_id,
        message: "function id must not be empty".to_string(),
      });
    }

    let mut steps = self.steps.write();
    if steps.contains_key(&descriptor.function_id) {
      event!(Level::ERROR, function_id = %descriptor.function_id, "Duplicate step registration.");
      return Err(ChainError::Registration {
        message: "a step with this id is already registered".to_string(),
        function_id: descriptor.function_id,
      });
    }

    event!(
      Level::DEBUG,
      function_id = %descriptor.function_id,
      kind = ?descriptor.kind,
      arity = ?descriptor.arity,
      "Registering step."
    );
    steps.insert(descriptor.function_id.clone(), Arc::new(descriptor));
    Ok(())
  }

  pub fn register_step<F, Fut>(
    &self,
    function_id: impl Into<String>,
    kind: StepKind,
    arity: Arity,
    step_fn: F,
  ) -> ChainResult<()>
  where
    F: Fn(StepCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
  {
    self.register(StepDescriptor::new(function_id, kind, arity, step_fn))
  }

  /// Registers a root step (no predecessor input, chainable).
  pub fn root<F, Fut>(&self, function_id: impl Into<String>, arity: Arity, step_fn: F) -> ChainResult<()>
  where
    F: Fn(StepCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
  {
    self.register_step(function_id, StepKind::Root, arity, step_fn)
  }

  /// Registers a chained step (consumes the predecessor, chainable).
  pub fn chained<F, Fut>(&self, function_id: impl Into<String>, arity: Arity, step_fn: F) -> ChainResult<()>
  where
    F: Fn(StepCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
  {
    self.register_step(function_id, StepKind::Chained, arity, step_fn)
  }

  /// Registers a terminal step (consumes the predecessor, resolves the chain).
  pub fn terminal<F, Fut>(&self, function_id: impl Into<String>, arity: Arity, step_fn: F) -> ChainResult<()>
  where
    F: Fn(StepCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
  {
    self.register_step(function_id, StepKind::Terminal, arity, step_fn)
  }

  pub fn get(&self, function_id: &str) -> Option<Arc<StepDescriptor>> {
    self.steps.read().get(function_id).cloned()
  }

  pub(crate) fn lookup(&self, function_id: &str) -> ChainResult<Arc<StepDescriptor>> {
    self.get(function_id).ok_or_else(|| {
      event!(Level::ERROR, %function_id, "Step not registered.");
      ChainError::UnknownStep {
        function_id: function_id.to_string(),
      }
    })
  }

  pub fn contains(&self, function_id: &str) -> bool {
    self.steps.read().contains_key(function_id)
  }

  pub fn len(&self) -> usize {
    self.steps.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.read().is_empty()
  }

  /// Registered ids, sorted.
  pub fn function_ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = self.steps.read().keys().cloned().collect();
    ids.sort();
    ids
  }
}
