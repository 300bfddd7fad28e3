use crate::calculations::{
    BackwardPass, CriticalPathExtractor, EarlyDates, FloatDates, ForwardPass, LateDates,
};
use crate::config::ScheduleConfig;
use crate::error::ScheduleResult;
use crate::graph::{ExecutionPlan, ScheduleDag, UnresolvedReference, topological_order};
use crate::network::TaskNetwork;
use crate::task::{DependencyType, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Computed dates for one task, as integer offsets from the project epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSchedule {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub duration: i64,
    pub early_start: i64,
    pub early_finish: i64,
    pub late_start: i64,
    pub late_finish: i64,
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
    pub is_near_critical: bool,
}

/// A zero-slack dependency between two critical tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalEdge {
    pub predecessor_id: TaskId,
    pub successor_id: TaskId,
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
    pub lag: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub near_critical_count: usize,
    pub project_duration: i64,
    pub critical_path: Vec<TaskId>,
    pub ignored_reference_count: usize,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        if self.near_critical_count > 0 {
            parts.push(format!("near_critical={}", self.near_critical_count));
        }
        parts.push(format!("duration={}", self.project_duration));
        if self.ignored_reference_count > 0 {
            parts.push(format!("ignored_refs={}", self.ignored_reference_count));
        }
        if !self.critical_path.is_empty() {
            let chain = self
                .critical_path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("->");
            parts.push(format!("crit_path={}", chain));
        }
        parts.join(", ")
    }
}

/// Immutable result of one CPM computation. Tasks appear in network order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSnapshot {
    tasks: Vec<TaskSchedule>,
    project_duration: i64,
    critical_path_duration: i64,
    near_critical_threshold: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    critical_edges: Vec<CriticalEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ignored_references: Vec<UnresolvedReference>,
    #[serde(skip)]
    index: HashMap<TaskId, usize>,
}

impl ScheduleSnapshot {
    fn new(
        tasks: Vec<TaskSchedule>,
        project_duration: i64,
        near_critical_threshold: i64,
        critical_edges: Vec<CriticalEdge>,
        ignored_references: Vec<UnresolvedReference>,
    ) -> Self {
        let index = tasks
            .iter()
            .enumerate()
            .map(|(position, task)| (task.id.clone(), position))
            .collect();
        let critical_path_duration = if tasks.is_empty() { 0 } else { project_duration };
        Self {
            tasks,
            project_duration,
            critical_path_duration,
            near_critical_threshold,
            critical_edges,
            ignored_references,
            index,
        }
    }

    pub fn tasks(&self) -> &[TaskSchedule] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&TaskSchedule> {
        self.index.get(id).map(|&position| &self.tasks[position])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn project_duration(&self) -> i64 {
        self.project_duration
    }

    pub fn critical_path_duration(&self) -> i64 {
        self.critical_path_duration
    }

    pub fn near_critical_threshold(&self) -> i64 {
        self.near_critical_threshold
    }

    pub fn critical_task_ids(&self) -> HashSet<&TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.is_critical)
            .map(|task| &task.id)
            .collect()
    }

    pub fn near_critical_tasks(&self) -> impl Iterator<Item = &TaskSchedule> {
        self.tasks.iter().filter(|task| task.is_near_critical)
    }

    /// Critical tasks ordered by early start, then early finish, then
    /// network order.
    pub fn critical_path(&self) -> Vec<&TaskId> {
        let mut critical: Vec<(usize, &TaskSchedule)> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_critical)
            .collect();
        critical.sort_by(|(pa, a), (pb, b)| {
            a.early_start
                .cmp(&b.early_start)
                .then_with(|| a.early_finish.cmp(&b.early_finish))
                .then_with(|| pa.cmp(pb))
        });
        critical.into_iter().map(|(_, task)| &task.id).collect()
    }

    /// Driving edges restricted to the critical set; callers rebuild chains
    /// from these.
    pub fn critical_edges(&self) -> &[CriticalEdge] {
        &self.critical_edges
    }

    /// Predecessor references that matched no task and were skipped.
    pub fn ignored_references(&self) -> &[UnresolvedReference] {
        &self.ignored_references
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            task_count: self.tasks.len(),
            critical_count: self.tasks.iter().filter(|t| t.is_critical).count(),
            near_critical_count: self.near_critical_tasks().count(),
            project_duration: self.project_duration,
            critical_path: self.critical_path().into_iter().cloned().collect(),
            ignored_reference_count: self.ignored_references.len(),
        }
    }
}

/// Computes the CPM schedule for `network`.
///
/// Runs validation, cycle detection, the forward pass, the backward pass and
/// float extraction in that order. Any failure returns an error and no
/// snapshot; the network itself is only read.
#[instrument(level = "debug", skip_all, fields(tasks = network.len()))]
pub fn compute_schedule(
    network: &TaskNetwork,
    config: &ScheduleConfig,
) -> ScheduleResult<ScheduleSnapshot> {
    let dag = ScheduleDag::build(network.tasks(), config.unresolved_predecessors)?;
    let order = topological_order(&dag)?;
    let plan = ExecutionPlan::new(&dag, order);
    debug!(
        edges = dag.edge_count(),
        levels = plan.levels().len(),
        width = plan.width(),
        "dependency graph validated"
    );

    let early: Vec<EarlyDates> = ForwardPass::new(&dag, &plan, config).execute()?;
    let project_duration = early.iter().map(|d| d.early_finish).max().unwrap_or(0);
    let late: Vec<LateDates> = BackwardPass::new(&dag, &plan, config).execute(project_duration)?;

    let extractor = CriticalPathExtractor::new(&dag, &early, &late, project_duration);
    let floats: Vec<FloatDates> = extractor.execute(config.near_critical_threshold)?;
    let critical_edges = extractor
        .driving_edges(&floats)
        .into_iter()
        .map(|(pred, succ, link)| CriticalEdge {
            predecessor_id: dag.task(pred).id.clone(),
            successor_id: dag.task(succ).id.clone(),
            dependency_type: link.dependency_type,
            lag: link.lag,
        })
        .collect();

    let tasks: Vec<TaskSchedule> = dag
        .graph
        .node_indices()
        .map(|node| {
            let task = dag.task(node);
            let e = early[node.index()];
            let l = late[node.index()];
            let f = floats[node.index()];
            TaskSchedule {
                id: task.id.clone(),
                name: task.name.clone(),
                duration: task.duration,
                early_start: e.early_start,
                early_finish: e.early_finish,
                late_start: l.late_start,
                late_finish: l.late_finish,
                total_float: f.total_float,
                free_float: f.free_float,
                is_critical: f.is_critical,
                is_near_critical: f.is_near_critical,
            }
        })
        .collect();

    let snapshot = ScheduleSnapshot::new(
        tasks,
        project_duration,
        config.near_critical_threshold,
        critical_edges,
        dag.unresolved.clone(),
    );
    debug!(
        project_duration,
        critical = snapshot.critical_task_ids().len(),
        "schedule computed"
    );
    Ok(snapshot)
}
