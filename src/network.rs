use crate::config::ScheduleConfig;
use crate::error::ScheduleResult;
use crate::schedule::{self, ScheduleSnapshot};
use crate::task::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// The caller-owned set of tasks forming a dependency graph through their
/// predecessor edges. Task order is preserved and drives output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNetwork {
    pub tasks: Vec<Task>,
}

impl TaskNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().collect(),
        }
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id.as_str() == id)
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.iter().map(|task| &task.id)
    }

    /// Runs the full CPM computation. See [`schedule::compute_schedule`].
    pub fn schedule(&self, config: &ScheduleConfig) -> ScheduleResult<ScheduleSnapshot> {
        schedule::compute_schedule(self, config)
    }
}

impl FromIterator<Task> for TaskNetwork {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self::from_tasks(iter)
    }
}
