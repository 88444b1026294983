// src/dag/graph.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ExecuteOptions;
use crate::dag::planner::LayerPlanner;
use crate::dag::store::{DependencyStore, PetgraphStore};
use crate::dag::task::{Task, TaskNode, TaskRef};
use crate::errors::{Result, TaskDagError};
use crate::types::{TaskId, TaskStatus};

/// Task registry: the dependency store, the layer assignment, and the
/// registered task definitions.
///
/// The graph is built once through [`add_task`](Self::add_task) and can then
/// be executed any number of times. Construction needs `&mut self`;
/// execution only needs `&self`, so concurrent runs share the registry
/// read-only.
pub struct TaskGraph<T, S = PetgraphStore> {
    store: S,
    planner: LayerPlanner,
    tasks: HashMap<TaskId, Arc<TaskNode<T>>>,
    options: ExecuteOptions,
}

impl<T> TaskGraph<T> {
    /// Empty graph backed by [`PetgraphStore`] with default options.
    pub fn new() -> Self {
        Self::with_store(PetgraphStore::new())
    }
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: DependencyStore> TaskGraph<T, S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            planner: LayerPlanner::new(),
            tasks: HashMap::new(),
            options: ExecuteOptions::default(),
        }
    }

    /// Options used by [`execute`](Self::execute).
    pub fn with_options(mut self, options: ExecuteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ExecuteOptions {
        self.options
    }

    /// Register a task.
    ///
    /// Steps, in order: insert the vertex, insert one edge per dependency,
    /// check the whole graph is still acyclic, assign the layer.
    ///
    /// Registration is not transactional. If a step fails, whatever the
    /// earlier steps inserted stays in the dependency store and the task is
    /// not registered. After a [`TaskDagError::CyclicGraph`] the graph keeps
    /// failing [`execution_order`](Self::execution_order) and
    /// [`execute`](Self::execute); discard it.
    pub fn add_task(&mut self, task: Task<T>) -> Result<TaskRef> {
        self.store.add_vertex(&task.id)?;

        for dep in &task.depends {
            self.store.add_edge(dep, &task.id)?;
        }

        if let Err(err) = self.store.topological_sort() {
            warn!(task = %task.id, error = %err, "task graph became cyclic");
            return Err(err);
        }

        let layer = self.planner.assign(&task.id, &task.depends)?;
        debug!(
            task = %task.id,
            layer,
            deps = ?task.depends,
            "registered task"
        );

        let handle = task.handle();
        self.tasks
            .insert(task.id.clone(), Arc::new(TaskNode::new(task, layer)));
        Ok(handle)
    }

    /// A topologically valid order of every vertex in the store.
    pub fn execution_order(&self) -> Result<Vec<TaskId>> {
        self.store.topological_sort()
    }

    /// Status of a task as last written by any run.
    ///
    /// A task that a later run never started (cancelled, or stopped by an
    /// earlier failure) keeps the status an earlier run left, not `Pending`.
    /// Runs are not isolated from each other here; use
    /// [`RunOutput::statuses`](crate::engine::RunOutput) for the view of a
    /// single run.
    pub fn task_status(&self, id: &str) -> Result<TaskStatus> {
        Ok(self.node(id)?.status())
    }

    pub fn layer_of(&self, id: &str) -> Result<usize> {
        Ok(self.node(id)?.layer)
    }

    /// Declared dependencies of a task, in declaration order.
    pub fn dependencies_of(&self, id: &str) -> Result<&[TaskId]> {
        Ok(self.node(id)?.depends.as_slice())
    }

    /// Registered tasks grouped by layer.
    pub fn layers(&self) -> Vec<Vec<TaskId>> {
        self.planner.group()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn node(&self, id: &str) -> Result<&Arc<TaskNode<T>>> {
        self.tasks
            .get(id)
            .ok_or_else(|| TaskDagError::NotFound(id.to_string()))
    }

    pub(crate) fn planner(&self) -> &LayerPlanner {
        &self.planner
    }
}

impl<T, S> fmt::Debug for TaskGraph<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph")
            .field("planner", &self.planner)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
