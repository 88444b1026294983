// src/dag/mod.rs

//! Task graph construction.
//!
//! - [`store`] is the directed graph underneath (vertex/edge insertion,
//!   topological sort, cycle detection).
//! - [`task`] holds the caller-facing task definition.
//! - [`planner`] assigns each task its dependency layer.
//! - [`graph`] is the registry tying the three together.

pub mod graph;
pub mod planner;
pub mod store;
pub mod task;

pub use graph::TaskGraph;
pub use planner::LayerPlanner;
pub use store::{DependencyStore, PetgraphStore};
pub use task::{GuardFn, Inputs, Task, TaskFuture, TaskRef, WorkFn};
