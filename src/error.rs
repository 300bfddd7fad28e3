use crate::task::TaskId;
use thiserror::Error;

/// Errors surfaced by a schedule computation. None of them leave partial
/// output behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("dependency cycle detected: {}", format_cycle(.cycle))]
    CycleDetected { cycle: Vec<TaskId> },

    #[error("task {task_id} has negative duration {duration}")]
    InvalidDuration { task_id: TaskId, duration: i64 },

    #[error("task {task_id} references unknown predecessor {predecessor_id}")]
    UnknownPredecessorReference {
        task_id: TaskId,
        predecessor_id: TaskId,
    },

    #[error("duplicate task id {0}")]
    DuplicateTaskId(TaskId),

    #[error("dates of task {task_id} fall outside the representable range")]
    DateOverflow { task_id: TaskId },
}

impl ScheduleError {
    /// Ids the caller should highlight when reporting the error.
    pub fn offending_tasks(&self) -> Vec<&TaskId> {
        match self {
            ScheduleError::CycleDetected { cycle } => cycle.iter().collect(),
            ScheduleError::InvalidDuration { task_id, .. }
            | ScheduleError::UnknownPredecessorReference { task_id, .. }
            | ScheduleError::DuplicateTaskId(task_id)
            | ScheduleError::DateOverflow { task_id } => vec![task_id],
        }
    }
}

fn format_cycle(cycle: &[TaskId]) -> String {
    let mut chain: Vec<&str> = cycle.iter().map(TaskId::as_str).collect();
    if let Some(first) = cycle.first() {
        chain.push(first.as_str());
    }
    chain.join(" -> ")
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
