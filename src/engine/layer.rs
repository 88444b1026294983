// src/engine/layer.rs

//! Layer executor: runs one layer of mutually independent tasks.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::dag::Inputs;
use crate::dag::task::TaskNode;
use crate::engine::RunContext;
use crate::errors::{Result, TaskDagError};
use crate::types::{TaskId, TaskStatus};

/// What one layer produced.
#[derive(Debug)]
pub(crate) struct LayerReport<T> {
    /// Results of tasks that completed. Skipped tasks have no entry.
    pub results: HashMap<TaskId, T>,
    /// Status of every task in the layer at the end of the layer.
    pub statuses: HashMap<TaskId, TaskStatus>,
}

/// How a spawned task settled when it did not fail.
enum Settled<T> {
    Completed(T),
    Skipped,
    /// The layer was cancelled before the task obtained a worker.
    NotStarted,
}

/// Run every task of `layer` concurrently, at most `worker_count` bodies at
/// a time, and wait for all of them to settle.
///
/// `results` holds the outputs of all earlier layers; each task receives the
/// entries for its own dependencies. The first failure cancels a child of
/// `parent` shared by the whole layer before the failing task gives up its
/// worker, so queued tasks never start; the executor still waits for every
/// spawned task before returning that failure.
pub(crate) async fn execute_layer<T>(
    parent: &RunContext,
    layer: usize,
    tasks: Vec<Arc<TaskNode<T>>>,
    results: &HashMap<TaskId, T>,
    worker_count: usize,
) -> Result<LayerReport<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let ctx = parent.child();
    let permits = worker_count.clamp(1, Semaphore::MAX_PERMITS);
    let workers = Arc::new(Semaphore::new(permits));

    let mut report = LayerReport {
        results: HashMap::with_capacity(tasks.len()),
        statuses: HashMap::with_capacity(tasks.len()),
    };

    let mut join_set = JoinSet::new();
    let mut spawned = HashMap::with_capacity(tasks.len());

    for node in tasks {
        let inputs = collect_inputs(&node, results);
        report.statuses.insert(node.id.clone(), TaskStatus::Pending);

        let handle = join_set.spawn(run_task(
            Arc::clone(&node),
            ctx.clone(),
            inputs,
            Arc::clone(&workers),
        ));
        spawned.insert(handle.id(), node);
    }

    debug!(layer, tasks = spawned.len(), worker_count, "layer launched");

    let mut first_error: Option<TaskDagError> = None;

    while let Some(joined) = join_set.join_next().await {
        let (id, outcome) = match joined {
            Ok(settled) => settled,
            Err(join_err) => {
                let Some(node) = spawned.get(&join_err.id()) else {
                    warn!(layer, error = %join_err, "unattributed task join failure");
                    continue;
                };
                node.set_status(TaskStatus::Failed);
                let error = TaskDagError::TaskExecutionFailure {
                    task: node.id.clone(),
                    error: anyhow!("task panicked or was aborted: {join_err}"),
                };
                (node.id.clone(), Err(error))
            }
        };

        match outcome {
            Ok(Settled::Completed(value)) => {
                report.statuses.insert(id.clone(), TaskStatus::Completed);
                report.results.insert(id, value);
            }
            Ok(Settled::Skipped) => {
                report.statuses.insert(id, TaskStatus::Skipped);
            }
            Ok(Settled::NotStarted) => {}
            Err(err) => {
                report.statuses.insert(id.clone(), TaskStatus::Failed);
                if first_error.is_none() {
                    warn!(
                        task = %id,
                        layer,
                        error = %err,
                        "task failed; cancelling the rest of the layer"
                    );
                    ctx.cancel();
                    first_error = Some(err);
                } else {
                    debug!(task = %id, layer, error = %err, "additional failure in layer");
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    let not_started = report
        .statuses
        .values()
        .filter(|s| !s.is_terminal())
        .count();
    if not_started > 0 {
        warn!(layer, not_started, "layer cancelled by caller before all tasks started");
        return Err(TaskDagError::Cancelled);
    }

    Ok(report)
}

/// Dependency results available for `node`. Missing entries (skipped or
/// failed dependencies) are left out.
fn collect_inputs<T: Clone>(node: &TaskNode<T>, results: &HashMap<TaskId, T>) -> Inputs<T> {
    node.depends
        .iter()
        .filter_map(|dep| results.get(dep).map(|value| (dep.clone(), value.clone())))
        .collect()
}

async fn run_task<T>(
    node: Arc<TaskNode<T>>,
    ctx: RunContext,
    inputs: Inputs<T>,
    workers: Arc<Semaphore>,
) -> (TaskId, Result<Settled<T>>)
where
    T: Send + Sync + 'static,
{
    let outcome = run_task_inner(&node, ctx, inputs, workers).await;
    (node.id.clone(), outcome)
}

async fn run_task_inner<T>(
    node: &TaskNode<T>,
    ctx: RunContext,
    inputs: Inputs<T>,
    workers: Arc<Semaphore>,
) -> Result<Settled<T>>
where
    T: Send + Sync + 'static,
{
    let _permit = workers
        .acquire_owned()
        .await
        .map_err(|_| anyhow!("worker pool closed unexpectedly"))?;

    if ctx.is_cancelled() {
        debug!(task = %node.id, layer = node.layer, "layer cancelled; not starting task");
        return Ok(Settled::NotStarted);
    }

    // Declared after the permit so it fires before the permit is released.
    let cancel_on_exit = CancelOnDrop::new(&ctx);

    if let Some(guard) = &node.guard {
        if !guard(&inputs) {
            cancel_on_exit.disarm();
            node.set_status(TaskStatus::Skipped);
            info!(task = %node.id, layer = node.layer, "condition not met; skipping task");
            return Ok(Settled::Skipped);
        }
    }

    node.set_status(TaskStatus::Running);
    debug!(
        task = %node.id,
        layer = node.layer,
        inputs = inputs.len(),
        "starting task"
    );

    match (node.work)(ctx.clone(), inputs).await {
        Ok(value) => {
            cancel_on_exit.disarm();
            node.set_status(TaskStatus::Completed);
            info!(task = %node.id, layer = node.layer, "task completed");
            Ok(Settled::Completed(value))
        }
        Err(error) => {
            node.set_status(TaskStatus::Failed);
            Err(TaskDagError::TaskExecutionFailure {
                task: node.id.clone(),
                error,
            })
        }
    }
}

/// Cancels the layer context when dropped unless disarmed.
///
/// Fires on an error return and on unwinding. Must be dropped before the
/// worker permit, or a queued task could start after a failure.
struct CancelOnDrop<'a> {
    ctx: &'a RunContext,
    armed: bool,
}

impl<'a> CancelOnDrop<'a> {
    fn new(ctx: &'a RunContext) -> Self {
        Self { ctx, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ctx.cancel();
        }
    }
}
