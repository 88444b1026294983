// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::TaskId;

#[derive(Error, Debug)]
pub enum TaskDagError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(TaskId),

    #[error("dependency '{dependency}' of task '{task}' not found in layer map")]
    UnknownDependency { task: TaskId, dependency: TaskId },

    #[error("cycle detected in task graph involving task '{0}'")]
    CyclicGraph(TaskId),

    /// A work function returned an error (or panicked).
    #[error("task {task} failed: {error}")]
    TaskExecutionFailure { task: TaskId, error: anyhow::Error },

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("execution cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskDagError {
    /// Id of the task this error is attributed to, if any.
    pub fn task(&self) -> Option<&str> {
        match self {
            TaskDagError::DuplicateTask(id)
            | TaskDagError::CyclicGraph(id)
            | TaskDagError::NotFound(id) => Some(id),
            TaskDagError::UnknownDependency { task, .. }
            | TaskDagError::TaskExecutionFailure { task, .. } => Some(task),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskDagError>;
