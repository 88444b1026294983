// src/dag/store.rs

//! Dependency store: the directed graph underneath the task registry.
//!
//! The registry only needs vertex/edge insertion keyed by task id and a
//! topological sort that doubles as cycle detection. [`DependencyStore`]
//! captures that capability; [`PetgraphStore`] is the default implementation.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{Result, TaskDagError};
use crate::types::TaskId;

/// Directed graph keyed by task id.
///
/// Edge direction is `dependency -> dependent`.
pub trait DependencyStore: Send + Sync {
    /// Insert a vertex. Fails with [`TaskDagError::DuplicateTask`] if the id
    /// is already present.
    fn add_vertex(&mut self, id: &str) -> Result<()>;

    /// Insert the edge `from -> to`. Fails with
    /// [`TaskDagError::UnknownDependency`] if either endpoint is absent.
    /// Inserting an edge that already exists is a no-op.
    fn add_edge(&mut self, from: &str, to: &str) -> Result<()>;

    /// A valid linear order of all vertices, or [`TaskDagError::CyclicGraph`].
    fn topological_sort(&self) -> Result<Vec<TaskId>>;

    fn contains(&self, id: &str) -> bool;
}

/// [`DependencyStore`] backed by a `petgraph` directed graph.
#[derive(Debug, Clone, Default)]
pub struct PetgraphStore {
    graph: DiGraph<TaskId, ()>,
    index: HashMap<TaskId, NodeIndex>,
}

impl PetgraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DependencyStore for PetgraphStore {
    fn add_vertex(&mut self, id: &str) -> Result<()> {
        if self.index.contains_key(id) {
            return Err(TaskDagError::DuplicateTask(id.to_string()));
        }
        let node = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), node);
        Ok(())
    }

    fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let missing = |endpoint: &str| TaskDagError::UnknownDependency {
            task: to.to_string(),
            dependency: endpoint.to_string(),
        };
        let a = *self.index.get(from).ok_or_else(|| missing(from))?;
        let b = *self.index.get(to).ok_or_else(|| missing(to))?;
        self.graph.update_edge(a, b, ());
        Ok(())
    }

    fn topological_sort(&self) -> Result<Vec<TaskId>> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|node| self.graph[node].clone())
                .collect()),
            Err(cycle) => Err(TaskDagError::CyclicGraph(
                self.graph[cycle.node_id()].clone(),
            )),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}
