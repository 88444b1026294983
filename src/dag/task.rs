// src/dag/task.rs

//! Task definitions as supplied by callers.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::engine::RunContext;
use crate::types::{TaskId, TaskStatus};

/// Results of a task's dependencies, keyed by dependency id.
///
/// Dependencies that were skipped or failed are absent.
pub type Inputs<T> = HashMap<TaskId, T>;

/// Boxed future returned by a work function.
pub type TaskFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'static>>;

/// Type-erased work function.
pub type WorkFn<T> = Arc<dyn Fn(RunContext, Inputs<T>) -> TaskFuture<T> + Send + Sync>;

/// Type-erased guard predicate.
pub type GuardFn<T> = Arc<dyn Fn(&Inputs<T>) -> bool + Send + Sync>;

/// Reference to a task, used to declare dependencies.
///
/// Obtained from [`TaskGraph::add_task`](crate::dag::TaskGraph::add_task), or
/// from [`Task::handle`] before registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskRef {
    id: TaskId,
}

impl TaskRef {
    pub(crate) fn new(id: TaskId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A unit of work plus its dependencies and optional guard condition.
pub struct Task<T> {
    pub(crate) id: TaskId,
    pub(crate) work: WorkFn<T>,
    pub(crate) depends: Vec<TaskId>,
    pub(crate) guard: Option<GuardFn<T>>,
}

impl<T> Task<T> {
    /// Create a task from an async work function.
    ///
    /// The function receives the run's [`RunContext`] and the results of the
    /// task's dependencies. Long-running bodies should watch the context and
    /// return early once it is cancelled.
    pub fn new<F, Fut>(id: impl Into<TaskId>, work: F) -> Self
    where
        T: 'static,
        F: Fn(RunContext, Inputs<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            id: id.into(),
            work: Arc::new(move |ctx, inputs| -> TaskFuture<T> { Box::pin(work(ctx, inputs)) }),
            depends: Vec::new(),
            guard: None,
        }
    }

    /// Declare a dependency. Order of declaration is preserved.
    pub fn depends_on(mut self, dep: &TaskRef) -> Self {
        self.depends.push(dep.id.clone());
        self
    }

    /// Declare several dependencies at once.
    pub fn depends_on_all<'a>(mut self, deps: impl IntoIterator<Item = &'a TaskRef>) -> Self {
        self.depends.extend(deps.into_iter().map(|d| d.id.clone()));
        self
    }

    /// Attach a guard. When it returns `false` at execution time the task is
    /// skipped and its work function is never called.
    pub fn with_condition<G>(mut self, guard: G) -> Self
    where
        G: Fn(&Inputs<T>) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// A reference to this task, usable before it is registered.
    pub fn handle(&self) -> TaskRef {
        TaskRef::new(self.id.clone())
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("depends", &self.depends)
            .field("has_guard", &self.guard.is_some())
            .finish_non_exhaustive()
    }
}

/// A registered task: the caller's definition plus derived layer and the
/// last observed status.
pub(crate) struct TaskNode<T> {
    pub id: TaskId,
    pub work: WorkFn<T>,
    pub depends: Vec<TaskId>,
    pub guard: Option<GuardFn<T>>,
    pub layer: usize,
    status: Mutex<TaskStatus>,
}

impl<T> TaskNode<T> {
    pub fn new(task: Task<T>, layer: usize) -> Self {
        Self {
            id: task.id,
            work: task.work,
            depends: task.depends,
            guard: task.guard,
            layer,
            status: Mutex::new(TaskStatus::Pending),
        }
    }

    pub fn status(&self) -> TaskStatus {
        *self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_status(&self, status: TaskStatus) {
        *self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }
}
