// src/types.rs

use std::fmt;

/// Canonical task identifier type used throughout the crate.
pub type TaskId = String;

/// Status of a task as last observed by the layer executor.
///
/// - `Pending`: registered, or part of a run but not started yet.
/// - `Running`: the work function has been invoked and has not returned.
/// - `Completed`, `Failed`, `Skipped`: terminal states for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// Whether this status ends a task's participation in a run.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    /// Whether dependents may treat this task as settled successfully.
    pub fn is_settled_ok(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}
