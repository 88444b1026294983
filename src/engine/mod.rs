// src/engine/mod.rs

//! Execution engine for taskdag.
//!
//! - [`context`] is the cancellable context handed to work functions.
//! - [`layer`] runs one layer of independent tasks with bounded parallelism.
//! - [`runner`] drives a whole run layer by layer and merges results.

pub mod context;
pub(crate) mod layer;
pub mod runner;

pub use context::RunContext;
pub use runner::RunOutput;
