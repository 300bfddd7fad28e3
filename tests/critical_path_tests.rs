use cpm_schedule::{
    DependencyType, ScheduleConfig, ScheduleError, ScheduleSnapshot, Task, TaskId, TaskNetwork,
    UnresolvedPredecessorPolicy, UnresolvedReference,
};

fn network() -> TaskNetwork {
    // A(2) -> B(1) -> D(1), C(5) -> D
    TaskNetwork::from_tasks(vec![
        Task::new("A", 2),
        Task::new("B", 1).after("A"),
        Task::new("C", 5),
        Task::new("D", 1).after("B").after("C"),
    ])
}

fn run(config: &ScheduleConfig) -> ScheduleSnapshot {
    network().schedule(config).unwrap()
}

#[test]
fn critical_set_and_path_follow_longest_chain() {
    let snapshot = run(&ScheduleConfig::default());
    let critical = snapshot.critical_task_ids();
    assert_eq!(critical.len(), 2);
    assert!(critical.contains(&TaskId::from("C")));
    assert!(critical.contains(&TaskId::from("D")));

    let path: Vec<&str> = snapshot.critical_path().iter().map(|id| id.as_str()).collect();
    assert_eq!(path, vec!["C", "D"]);

    let edges = snapshot.critical_edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].predecessor_id.as_str(), "C");
    assert_eq!(edges[0].successor_id.as_str(), "D");
    assert_eq!(edges[0].dependency_type, DependencyType::FinishToStart);
}

#[test]
fn free_float_is_bounded_by_total_float() {
    let snapshot = run(&ScheduleConfig::default());
    let a = snapshot.task("A").unwrap();
    let b = snapshot.task("B").unwrap();
    assert_eq!((a.total_float, a.free_float), (2, 0));
    assert_eq!((b.total_float, b.free_float), (2, 2));
    for task in snapshot.tasks() {
        assert!(task.free_float >= 0);
        assert!(task.free_float <= task.total_float);
    }
}

#[test]
fn near_critical_threshold_is_configurable() {
    let default = run(&ScheduleConfig::default());
    assert_eq!(default.near_critical_threshold(), 5);
    assert_eq!(default.near_critical_tasks().count(), 2);

    let tight = run(&ScheduleConfig::default().with_near_critical_threshold(1));
    assert_eq!(tight.near_critical_threshold(), 1);
    assert_eq!(tight.near_critical_tasks().count(), 0);

    let zero = run(&ScheduleConfig::default().with_near_critical_threshold(0));
    assert!(zero.tasks().iter().all(|t| !t.is_near_critical));
    assert_eq!(zero.critical_task_ids().len(), 2);
}

#[test]
fn parallel_chains_of_equal_length_are_both_critical() {
    let snapshot = TaskNetwork::from_tasks(vec![
        Task::new("A", 3),
        Task::new("B", 3),
        Task::new("end", 0).after("A").after("B"),
    ])
    .schedule(&ScheduleConfig::default())
    .unwrap();
    let path: Vec<&str> = snapshot.critical_path().iter().map(|id| id.as_str()).collect();
    assert_eq!(path, vec!["A", "B", "end"]);
    assert_eq!(snapshot.critical_edges().len(), 2);
}

#[test]
fn dangling_reference_is_ignored_and_reported_by_default() {
    let network = TaskNetwork::from_tasks(vec![Task::new("A", 3), Task::new("B", 2).after("A").after("ghost")]);
    let snapshot = network.schedule(&ScheduleConfig::default()).unwrap();
    assert_eq!(snapshot.task("B").unwrap().early_start, 3);
    assert_eq!(snapshot.project_duration(), 5);
    assert_eq!(
        snapshot.ignored_references(),
        &[UnresolvedReference {
            task_id: "B".into(),
            predecessor_id: "ghost".into(),
        }]
    );
    assert_eq!(snapshot.summary().ignored_reference_count, 1);
}

#[test]
fn dangling_reference_fails_under_strict_policy() {
    let network = TaskNetwork::from_tasks(vec![Task::new("A", 3), Task::new("B", 2).after("ghost")]);
    let config = ScheduleConfig::default().with_unresolved_predecessors(UnresolvedPredecessorPolicy::Reject);
    assert_eq!(config, ScheduleConfig::strict());
    let err = network.schedule(&config).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::UnknownPredecessorReference {
            task_id: "B".into(),
            predecessor_id: "ghost".into(),
        }
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let network = TaskNetwork::from_tasks(vec![Task::new("A", 3), Task::new("A", 2)]);
    let err = network.schedule(&ScheduleConfig::default()).unwrap_err();
    assert_eq!(err, ScheduleError::DuplicateTaskId("A".into()));
}
