// src/dag/planner.rs

//! Layer assignment.
//!
//! A task's layer is `0` when it has no dependencies, otherwise one more than
//! the highest layer among its dependencies. Every dependency therefore sits
//! in a strictly lower layer than its dependents, which is what lets a whole
//! layer run concurrently once all earlier layers have settled.

use std::collections::HashMap;

use crate::errors::{Result, TaskDagError};
use crate::types::TaskId;

#[derive(Debug, Clone, Default)]
pub struct LayerPlanner {
    layers: HashMap<TaskId, usize>,
    /// Registration order, used to keep grouping deterministic.
    order: Vec<TaskId>,
}

impl LayerPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and record the layer for `task`.
    ///
    /// Every dependency must already have a layer.
    pub fn assign(&mut self, task: &str, deps: &[TaskId]) -> Result<usize> {
        let layer = self.layer_for(task, deps)?;
        if self.layers.insert(task.to_string(), layer).is_none() {
            self.order.push(task.to_string());
        }
        Ok(layer)
    }

    /// Layer `task` would get with the given dependencies, without recording it.
    fn layer_for(&self, task: &str, deps: &[TaskId]) -> Result<usize> {
        let mut max_dep: Option<usize> = None;
        for dep in deps {
            let layer = self.layers.get(dep).copied().ok_or_else(|| {
                TaskDagError::UnknownDependency {
                    task: task.to_string(),
                    dependency: dep.clone(),
                }
            })?;
            max_dep = Some(max_dep.map_or(layer, |m| m.max(layer)));
        }
        Ok(max_dep.map_or(0, |m| m + 1))
    }

    pub fn layer_of(&self, task: &str) -> Option<usize> {
        self.layers.get(task).copied()
    }

    pub fn max_layer(&self) -> Option<usize> {
        self.layers.values().copied().max()
    }

    /// Layer assignment in registration order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.layers[id]))
    }

    /// Tasks grouped into layers `0..=max_layer`, each in registration order.
    ///
    /// An empty planner yields no layers.
    pub fn group(&self) -> Vec<Vec<TaskId>> {
        let Some(max) = self.max_layer() else {
            return Vec::new();
        };

        let mut grouped = vec![Vec::new(); max + 1];
        for (id, layer) in self.assignments() {
            grouped[layer].push(id.to_string());
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
