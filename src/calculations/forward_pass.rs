use crate::config::ScheduleConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::graph::{DependencyLink, ExecutionPlan, ScheduleDag};
use crate::task::DependencyType;
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EarlyDates {
    pub early_start: i64,
    pub early_finish: i64,
}

/// Earliest start a single edge allows for a successor of `duration`.
///
/// Evaluated in `i128` so that any `i64` lag is exact; range checks happen
/// once the candidates are folded.
pub fn start_candidate(predecessor: EarlyDates, duration: i64, link: DependencyLink) -> i128 {
    let anchor = match link.dependency_type {
        DependencyType::FinishToStart => i128::from(predecessor.early_finish),
        DependencyType::StartToStart => i128::from(predecessor.early_start),
        DependencyType::FinishToFinish => {
            i128::from(predecessor.early_finish) - i128::from(duration)
        }
        DependencyType::StartToFinish => {
            i128::from(predecessor.early_start) - i128::from(duration)
        }
    };
    anchor + i128::from(link.lag)
}

pub struct ForwardPass<'a, 't> {
    dag: &'a ScheduleDag<'t>,
    plan: &'a ExecutionPlan,
    config: &'a ScheduleConfig,
}

impl<'a, 't> ForwardPass<'a, 't> {
    pub fn new(dag: &'a ScheduleDag<'t>, plan: &'a ExecutionPlan, config: &'a ScheduleConfig) -> Self {
        Self { dag, plan, config }
    }

    /// Early dates indexed by node. Levels are evaluated in order; a wide
    /// level is spread over the rayon pool and merged before the next one.
    /// The first task (in level order) whose dates leave the `i64` range
    /// aborts the pass.
    pub fn execute(&self) -> ScheduleResult<Vec<EarlyDates>> {
        let mut dates = vec![EarlyDates::default(); self.dag.node_count()];

        for level in self.plan.levels() {
            if self.config.runs_in_parallel(level.len()) {
                let level_results: Vec<(NodeIndex, ScheduleResult<EarlyDates>)> = level
                    .par_iter()
                    .map(|&node| (node, self.early_dates(node, &dates)))
                    .collect();
                for (node, value) in level_results {
                    dates[node.index()] = value?;
                }
            } else {
                for &node in level {
                    let value = self.early_dates(node, &dates)?;
                    dates[node.index()] = value;
                }
            }
        }

        Ok(dates)
    }

    fn early_dates(&self, node: NodeIndex, known: &[EarlyDates]) -> ScheduleResult<EarlyDates> {
        let duration = self.dag.duration(node);
        // Floor of 0: a lead can never pull a task before the project epoch.
        let early_start = self
            .dag
            .incoming(node)
            .map(|(pred, link)| start_candidate(known[pred.index()], duration, link))
            .fold(0, i128::max);
        let early_start = i64::try_from(early_start).map_err(|_| self.overflow(node))?;
        let early_finish = early_start
            .checked_add(duration)
            .ok_or_else(|| self.overflow(node))?;
        Ok(EarlyDates {
            early_start,
            early_finish,
        })
    }

    fn overflow(&self, node: NodeIndex) -> ScheduleError {
        ScheduleError::DateOverflow {
            task_id: self.dag.task(node).id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(dependency_type: DependencyType, lag: i64) -> DependencyLink {
        DependencyLink {
            dependency_type,
            lag,
        }
    }

    #[test]
    fn candidates_follow_dependency_type() {
        let pred = EarlyDates {
            early_start: 2,
            early_finish: 7,
        };
        assert_eq!(start_candidate(pred, 4, link(DependencyType::FinishToStart, 1)), 8);
        assert_eq!(start_candidate(pred, 4, link(DependencyType::StartToStart, 1)), 3);
        assert_eq!(start_candidate(pred, 4, link(DependencyType::FinishToFinish, 1)), 4);
        assert_eq!(start_candidate(pred, 4, link(DependencyType::StartToFinish, 1)), -1);
    }

    #[test]
    fn negative_lag_is_a_lead() {
        let pred = EarlyDates {
            early_start: 0,
            early_finish: 10,
        };
        assert_eq!(start_candidate(pred, 3, link(DependencyType::FinishToStart, -4)), 6);
    }

    #[test]
    fn extreme_lags_stay_exact() {
        let pred = EarlyDates {
            early_start: 0,
            early_finish: 5,
        };
        assert_eq!(
            start_candidate(pred, 0, link(DependencyType::FinishToStart, i64::MAX)),
            i128::from(i64::MAX) + 5
        );
        assert_eq!(
            start_candidate(pred, 0, link(DependencyType::FinishToStart, i64::MIN)),
            i128::from(i64::MIN) + 5
        );
    }
}
