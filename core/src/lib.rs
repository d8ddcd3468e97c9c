// memochain/src/lib.rs

//! memochain: a lazy command-chain execution engine with content-addressed,
//! step-level memoization.
//!
//! A chain is built by appending declarative steps (load, filter, aggregate,
//! sum...) that have been registered in a `StepCatalog`. Each step's cache key
//! is derived from everything before it, so:
//!  - Two chains built independently from the same steps share cache entries.
//!  - Re-resolving a chain only runs the steps after its deepest cached one.
//!  - Forked chains pay for their shared prefix once.
//!  - A failing step leaves every earlier cached step intact.
//!  - An unavailable cache store degrades to recomputation, never to failure.

pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::catalog::{sync_step, Arity, StepCall, StepCatalog, StepDescriptor, StepFn, StepKind};
pub use crate::config::EngineConfig;
pub use crate::core::command::CommandRecord;
pub use crate::core::key::{derive, DerivedKey};
pub use crate::core::value::{Arguments, Table, Value};
pub use crate::engine::Engine;
pub use crate::error::{CacheStoreError, ChainError, ChainResult};
pub use crate::pipeline::{Chain, Resolution, Resolver, StepOutcome};
pub use crate::store::{CacheStore, MemoryStore};

/*
    Core Workflow:
    1. Create a `StepCatalog` and register steps with `.root()`, `.chained()`
       or `.terminal()`, giving each a stable function id and an `Arity`.
    2. Pick a `CacheStore` (the bundled `MemoryStore`, or your own backend)
       and build an `Engine` from the catalog and the store.
    3. Build a chain: `engine.chain().then("load", args)?.then("filter", args)?`.
    4. Finish it with `.finish("sum", vec![]).await?`, or call `.resolve().await?`.
    5. Fork a chain with `.fork()` to extend a shared prefix in several directions.
*/
