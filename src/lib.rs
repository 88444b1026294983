// src/lib.rs

//! Dependency-aware task scheduling.
//!
//! Register tasks with their dependencies on a [`TaskGraph`]; each task gets
//! a layer one above its deepest dependency. [`TaskGraph::execute`] runs the
//! layers in order, every task of a layer concurrently (bounded by
//! [`ExecuteOptions::worker_count`]), and hands each task the results of its
//! dependencies.
//!
//! ```no_run
//! use taskdag::{Inputs, RunContext, Task, TaskGraph};
//!
//! # async fn demo() -> taskdag::errors::Result<()> {
//! let mut graph: TaskGraph<i64> = TaskGraph::new();
//! let user = graph.add_task(Task::new("user", |_ctx, _inputs| async { anyhow::Ok(7) }))?;
//! graph.add_task(
//!     Task::new("orders", |_ctx, inputs: Inputs<i64>| async move { anyhow::Ok(inputs["user"] * 2) })
//!         .depends_on(&user),
//! )?;
//!
//! let output = graph.execute(&RunContext::new()).await?;
//! assert_eq!(output.results["orders"], 14);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod types;

pub use config::ExecuteOptions;
pub use dag::{DependencyStore, Inputs, PetgraphStore, Task, TaskGraph, TaskRef};
pub use engine::{RunContext, RunOutput};
pub use errors::{Result, TaskDagError};
pub use types::{TaskId, TaskStatus};
