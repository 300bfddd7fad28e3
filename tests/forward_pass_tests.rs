use cpm_schedule::{
    DependencyEdge, DependencyType, ScheduleConfig, ScheduleError, ScheduleSnapshot, Task,
    TaskNetwork, compute_schedule,
};

fn run(tasks: Vec<Task>) -> ScheduleSnapshot {
    TaskNetwork::from_tasks(tasks)
        .schedule(&ScheduleConfig::default())
        .unwrap()
}

fn early(snapshot: &ScheduleSnapshot, id: &str) -> (i64, i64) {
    let task = snapshot.task(id).unwrap();
    (task.early_start, task.early_finish)
}

#[test]
fn forward_pass_diamond_uses_longest_predecessor() {
    // Graph: 1 -> {2,3} -> 4 with durations 2,3,1,2
    let snapshot = run(vec![
        Task::new("1", 2),
        Task::new("2", 3).after("1"),
        Task::new("3", 1).after("1"),
        Task::new("4", 2).after("2").after("3"),
    ]);
    assert_eq!(early(&snapshot, "1"), (0, 2));
    assert_eq!(early(&snapshot, "2"), (2, 5));
    assert_eq!(early(&snapshot, "3"), (2, 3));
    assert_eq!(early(&snapshot, "4"), (5, 7));
    assert_eq!(snapshot.project_duration(), 7);
}

#[test]
fn start_to_start_follows_predecessor_start() {
    let snapshot = run(vec![
        Task::new("A", 5),
        Task::new("B", 3).with_predecessor(DependencyEdge::new("A", DependencyType::StartToStart, 2)),
    ]);
    assert_eq!(early(&snapshot, "B"), (2, 5));
    assert_eq!(snapshot.project_duration(), 5);
}

#[test]
fn finish_to_finish_aligns_finishes() {
    let snapshot = run(vec![
        Task::new("A", 4),
        Task::new("B", 2).with_predecessor(DependencyEdge::new("A", DependencyType::FinishToFinish, 1)),
    ]);
    assert_eq!(early(&snapshot, "B"), (3, 5));
}

#[test]
fn start_to_finish_ties_successor_finish_to_predecessor_start() {
    let snapshot = run(vec![
        Task::new("A", 3),
        Task::new("B", 2).with_predecessor(DependencyEdge::new("A", DependencyType::StartToFinish, 4)),
    ]);
    assert_eq!(early(&snapshot, "B"), (2, 4));
    assert_eq!(snapshot.project_duration(), 4);
}

#[test]
fn lead_overlaps_but_never_starts_before_epoch() {
    let snapshot = run(vec![
        Task::new("A", 5),
        Task::new("B", 2).with_predecessor(DependencyEdge::new("A", DependencyType::FinishToStart, -2)),
        Task::new("C", 2).with_predecessor(DependencyEdge::new("A", DependencyType::StartToStart, -5)),
    ]);
    assert_eq!(early(&snapshot, "B"), (3, 5));
    assert_eq!(early(&snapshot, "C"), (0, 2));
}

#[test]
fn milestone_has_zero_length() {
    let snapshot = run(vec![Task::new("A", 3), Task::new("M", 0).after("A")]);
    assert_eq!(early(&snapshot, "M"), (3, 3));
    let m = snapshot.task("M").unwrap();
    assert_eq!((m.late_start, m.late_finish), (3, 3));
    assert!(m.is_critical);
}

#[test]
fn input_order_does_not_need_to_be_topological() {
    let snapshot = run(vec![
        Task::new("C", 1).after("B"),
        Task::new("B", 1).after("A"),
        Task::new("A", 1),
    ]);
    assert_eq!(early(&snapshot, "C"), (2, 3));
    let ids: Vec<&str> = snapshot.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["C", "B", "A"]);
}

#[test]
fn compact_notation_builds_the_same_edges() {
    let mut b = Task::new("B", 2);
    b.predecessors = DependencyEdge::parse_list("A:FF+1").unwrap();
    let snapshot = run(vec![Task::new("A", 4), b]);
    assert_eq!(early(&snapshot, "B"), (3, 5));
}

fn overflow_in(tasks: Vec<Task>) -> Option<String> {
    match compute_schedule(&TaskNetwork::from_tasks(tasks), &ScheduleConfig::default()) {
        Err(ScheduleError::DateOverflow { task_id }) => Some(task_id.to_string()),
        _ => None,
    }
}

#[test]
fn lag_past_the_integer_range_is_rejected() {
    let chained = overflow_in(vec![
        Task::new("Z", 1),
        Task::new("A", 1).after("Z"),
        Task::new("B", 0).with_predecessor(DependencyEdge::new(
            "A",
            DependencyType::FinishToStart,
            i64::MAX,
        )),
        Task::new("C", 0).with_predecessor(DependencyEdge::new(
            "B",
            DependencyType::FinishToStart,
            i64::MAX,
        )),
    ]);
    assert_eq!(chained.as_deref(), Some("B"));

    let single = overflow_in(vec![
        Task::new("A", 5),
        Task::new("B", 0).with_predecessor(DependencyEdge::new(
            "A",
            DependencyType::FinishToStart,
            i64::MAX,
        )),
    ]);
    assert_eq!(single.as_deref(), Some("B"));

    let long_task = overflow_in(vec![Task::new("A", 1), Task::new("B", i64::MAX).after("A")]);
    assert_eq!(long_task.as_deref(), Some("B"));
}

#[test]
fn lag_at_the_integer_limit_schedules_exactly() {
    let snapshot = run(vec![
        Task::new("A", 0),
        Task::new("B", 0).with_predecessor(DependencyEdge::new(
            "A",
            DependencyType::FinishToStart,
            i64::MAX,
        )),
    ]);
    assert_eq!(early(&snapshot, "B"), (i64::MAX, i64::MAX));
    assert_eq!(snapshot.project_duration(), i64::MAX);
    for task in snapshot.tasks() {
        assert_eq!(task.total_float, 0, "{}", task.id);
        assert!(task.is_critical);
    }
}

#[test]
fn most_negative_lead_clamps_to_epoch() {
    for dependency_type in DependencyType::ALL {
        let snapshot = run(vec![
            Task::new("A", 3),
            Task::new("B", 2).with_predecessor(DependencyEdge::new("A", dependency_type, i64::MIN)),
        ]);
        assert_eq!(early(&snapshot, "B"), (0, 2));
        let a = snapshot.task("A").unwrap();
        let b = snapshot.task("B").unwrap();
        assert_eq!((a.late_start, a.late_finish, a.total_float), (0, 3, 0));
        assert_eq!((b.late_start, b.late_finish, b.total_float), (1, 3, 1));
    }
}
