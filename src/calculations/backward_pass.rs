use crate::config::ScheduleConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::{DependencyLink, ExecutionPlan, ScheduleDag};
use crate::task::DependencyType;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LateDates {
    pub late_start: i64,
    pub late_finish: i64,
}

/// Latest finish a single edge allows for a predecessor of `duration`,
/// given the successor's late dates. Exact over the whole `i64` lag range.
pub fn finish_candidate(successor: LateDates, duration: i64, link: DependencyLink) -> i128 {
    let lag = i128::from(link.lag);
    let duration = i128::from(duration);
    match link.dependency_type {
        DependencyType::FinishToStart => i128::from(successor.late_start) - lag,
        DependencyType::StartToStart => i128::from(successor.late_start) - lag + duration,
        DependencyType::FinishToFinish => i128::from(successor.late_finish) - lag,
        DependencyType::StartToFinish => i128::from(successor.late_finish) - lag + duration,
    }
}

pub struct BackwardPass<'a, 't> {
    dag: &'a ScheduleDag<'t>,
    plan: &'a ExecutionPlan,
    config: &'a ScheduleConfig,
}

impl<'a, 't> BackwardPass<'a, 't> {
    pub fn new(dag: &'a ScheduleDag<'t>, plan: &'a ExecutionPlan, config: &'a ScheduleConfig) -> Self {
        Self { dag, plan, config }
    }

    /// Late dates indexed by node, anchored on `project_duration`.
    pub fn execute(&self, project_duration: i64) -> ScheduleResult<Vec<LateDates>> {
        let mut dates = vec![LateDates::default(); self.dag.node_count()];

        // Reverse level order: every successor sits on a later level.
        for level in self.plan.levels().iter().rev() {
            if self.config.runs_in_parallel(level.len()) {
                let level_results: Vec<(NodeIndex, ScheduleResult<LateDates>)> = level
                    .par_iter()
                    .map(|&node| (node, self.late_dates(node, &dates, project_duration)))
                    .collect();
                for (node, value) in level_results {
                    dates[node.index()] = value?;
                }
            } else {
                for &node in level {
                    let value = self.late_dates(node, &dates, project_duration)?;
                    dates[node.index()] = value;
                }
            }
        }

        Ok(dates)
    }

    fn late_dates(
        &self,
        node: NodeIndex,
        known: &[LateDates],
        project_duration: i64,
    ) -> ScheduleResult<LateDates> {
        let duration = self.dag.duration(node);
        // Sinks finish exactly at project end; nothing may finish after it.
        let late_finish = self
            .dag
            .outgoing(node)
            .map(|(succ, link)| finish_candidate(known[succ.index()], duration, link))
            .fold(i128::from(project_duration), i128::min);
        let overflow = || ScheduleError::DateOverflow {
            task_id: self.dag.task(node).id.clone(),
        };
        let late_finish = i64::try_from(late_finish).map_err(|_| overflow())?;
        let late_start = late_finish.checked_sub(duration).ok_or_else(overflow)?;
        Ok(LateDates {
            late_start,
            late_finish,
        })
    }
}
