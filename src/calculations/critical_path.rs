use super::backward_pass::LateDates;
use super::forward_pass::EarlyDates;
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::{DependencyLink, ScheduleDag};
use crate::task::DependencyType;
use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatDates {
    pub total_float: i64,
    pub free_float: i64,
    pub is_critical: bool,
    pub is_near_critical: bool,
}

/// How far the successor sits beyond what this edge strictly requires.
pub fn relationship_slack(predecessor: EarlyDates, successor: EarlyDates, link: DependencyLink) -> i128 {
    let (required, actual) = match link.dependency_type {
        DependencyType::FinishToStart => (predecessor.early_finish, successor.early_start),
        DependencyType::StartToStart => (predecessor.early_start, successor.early_start),
        DependencyType::FinishToFinish => (predecessor.early_finish, successor.early_finish),
        DependencyType::StartToFinish => (predecessor.early_start, successor.early_finish),
    };
    i128::from(actual) - (i128::from(required) + i128::from(link.lag))
}

/// Derives float and criticality from the results of both passes.
pub struct CriticalPathExtractor<'a, 't> {
    dag: &'a ScheduleDag<'t>,
    early: &'a [EarlyDates],
    late: &'a [LateDates],
    project_duration: i64,
}

impl<'a, 't> CriticalPathExtractor<'a, 't> {
    pub fn new(
        dag: &'a ScheduleDag<'t>,
        early: &'a [EarlyDates],
        late: &'a [LateDates],
        project_duration: i64,
    ) -> Self {
        Self {
            dag,
            early,
            late,
            project_duration,
        }
    }

    pub fn execute(&self, near_critical_threshold: i64) -> ScheduleResult<Vec<FloatDates>> {
        self.dag
            .graph
            .node_indices()
            .map(|node| {
                let total_float = self.late[node.index()]
                    .late_start
                    .checked_sub(self.early[node.index()].early_start)
                    .ok_or_else(|| ScheduleError::DateOverflow {
                        task_id: self.dag.task(node).id.clone(),
                    })?;
                // The clamp keeps free float inside [0, total_float], so the
                // narrowing back to i64 cannot fail.
                let free_float = self
                    .free_float(node)
                    .clamp(0, i128::from(total_float.max(0))) as i64;
                Ok(FloatDates {
                    total_float,
                    free_float,
                    is_critical: total_float == 0,
                    is_near_critical: total_float > 0 && total_float <= near_critical_threshold,
                })
            })
            .collect()
    }

    fn free_float(&self, node: NodeIndex) -> i128 {
        let own = self.early[node.index()];
        self.dag
            .outgoing(node)
            .map(|(succ, link)| relationship_slack(own, self.early[succ.index()], link))
            .min()
            .unwrap_or(i128::from(self.project_duration) - i128::from(own.early_finish))
    }

    /// Zero-slack edges between two critical tasks, in node order.
    pub fn driving_edges(&self, floats: &[FloatDates]) -> Vec<(NodeIndex, NodeIndex, DependencyLink)> {
        let mut edges = Vec::new();
        for node in self.dag.graph.node_indices() {
            if !floats[node.index()].is_critical {
                continue;
            }
            let mut outgoing: Vec<(NodeIndex, DependencyLink)> = self
                .dag
                .outgoing(node)
                .filter(|(succ, link)| {
                    floats[succ.index()].is_critical
                        && relationship_slack(self.early[node.index()], self.early[succ.index()], *link)
                            == 0
                })
                .collect();
            outgoing.sort_by_key(|(succ, _)| *succ);
            edges.extend(outgoing.into_iter().map(|(succ, link)| (node, succ, link)));
        }
        edges
    }
}
