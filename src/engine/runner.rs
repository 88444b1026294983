// src/engine/runner.rs

//! Run coordinator: drives a whole graph execution layer by layer.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ExecuteOptions;
use crate::config::validate::validate_execute_options;
use crate::dag::{DependencyStore, TaskGraph};
use crate::engine::RunContext;
use crate::engine::layer::execute_layer;
use crate::errors::{Result, TaskDagError};
use crate::types::{TaskId, TaskStatus};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutput<T> {
    /// Result of every task that completed. Skipped tasks have no entry.
    pub results: HashMap<TaskId, T>,
    /// Status of every task as of the end of this run.
    pub statuses: HashMap<TaskId, TaskStatus>,
}

impl<T> RunOutput<T> {
    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        self.statuses.get(id).copied()
    }

    pub fn into_results(self) -> HashMap<TaskId, T> {
        self.results
    }
}

impl<T, S> TaskGraph<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: DependencyStore,
{
    /// Execute the graph with the graph's own [`ExecuteOptions`].
    pub async fn execute(&self, ctx: &RunContext) -> Result<RunOutput<T>> {
        let options = self.options();
        self.execute_with(ctx, &options).await
    }

    /// Execute the graph layer by layer.
    ///
    /// Layer `n + 1` starts only after every task of layer `n` has settled.
    /// The first task failure aborts the run: no later layer starts and no
    /// partial results are returned. Cancelling `ctx` stops the run at the
    /// next layer boundary (tasks already running must observe `ctx`
    /// themselves).
    pub async fn execute_with(
        &self,
        ctx: &RunContext,
        options: &ExecuteOptions,
    ) -> Result<RunOutput<T>> {
        validate_execute_options(options)?;
        self.execution_order()?;

        let layers = self.layers();
        self.log_plan(&layers, options.debug_log);

        let mut results: HashMap<TaskId, T> = HashMap::with_capacity(self.len());
        let mut statuses: HashMap<TaskId, TaskStatus> = HashMap::with_capacity(self.len());

        for (index, layer) in layers.iter().enumerate() {
            if ctx.is_cancelled() {
                warn!(layer = index, "run cancelled before layer started");
                return Err(TaskDagError::Cancelled);
            }

            let nodes = layer
                .iter()
                .map(|id| self.node(id).cloned())
                .collect::<Result<Vec<_>>>()?;

            debug!(layer = index, tasks = ?layer, "executing layer");
            let report =
                execute_layer(ctx, index, nodes, &results, options.worker_count).await?;

            results.extend(report.results);
            statuses.extend(report.statuses);
        }

        info!(
            tasks = statuses.len(),
            completed = results.len(),
            layers = layers.len(),
            "task graph run finished"
        );

        Ok(RunOutput { results, statuses })
    }

    fn log_plan(&self, layers: &[Vec<TaskId>], verbose: bool) {
        let assignments: Vec<(&str, usize)> = self.planner().assignments().collect();
        if verbose {
            info!(?assignments, "task layers");
            info!(?layers, "layers");
        } else {
            debug!(?assignments, "task layers");
            debug!(?layers, "layers");
        }
    }
}
