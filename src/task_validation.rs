use crate::error::{ScheduleError, ScheduleResult};
use crate::task::Task;
use std::collections::HashSet;

pub fn validate_task(task: &Task) -> ScheduleResult<()> {
    if task.duration < 0 {
        return Err(ScheduleError::InvalidDuration {
            task_id: task.id.clone(),
            duration: task.duration,
        });
    }
    Ok(())
}

/// Checks every task in input order; the first offending task wins.
pub fn validate_task_collection(tasks: &[Task]) -> ScheduleResult<()> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            return Err(ScheduleError::DuplicateTaskId(task.id.clone()));
        }
        validate_task(task)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_milestone_is_valid() {
        assert!(validate_task(&Task::new("M", 0)).is_ok());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let err = validate_task(&Task::new("A", -1)).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidDuration {
                task_id: "A".into(),
                duration: -1
            }
        );
    }

    #[test]
    fn duplicate_ids_are_rejected_before_durations() {
        let tasks = vec![Task::new("A", 1), Task::new("A", -4)];
        assert_eq!(
            validate_task_collection(&tasks),
            Err(ScheduleError::DuplicateTaskId("A".into()))
        );
    }
}
