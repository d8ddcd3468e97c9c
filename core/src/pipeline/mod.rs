// memochain/src/pipeline/mod.rs

//! Defines the `Chain` builder and the `Resolver` that executes it.

pub mod definition;
pub mod execution;

pub use definition::{Chain, StepOutcome};
pub use execution::{Resolution, Resolver};
