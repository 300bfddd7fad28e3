use crate::persistence::PersistenceResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// How to treat a predecessor id that does not match any task in the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPredecessorPolicy {
    /// Drop the edge, log it and report it on the snapshot.
    #[default]
    Ignore,
    /// Fail the computation with `UnknownPredecessorReference`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Tasks with `0 < total_float <= near_critical_threshold` are near-critical.
    pub near_critical_threshold: i64,
    pub unresolved_predecessors: UnresolvedPredecessorPolicy,
    /// Minimum number of independent tasks in one dependency level before that
    /// level is evaluated on the rayon pool. `0` disables parallel evaluation.
    pub parallel_threshold: usize,
}

impl ScheduleConfig {
    pub const DEFAULT_NEAR_CRITICAL_THRESHOLD: i64 = 5;
    pub const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

    pub fn with_near_critical_threshold(mut self, threshold: i64) -> Self {
        self.near_critical_threshold = threshold;
        self
    }

    pub fn with_unresolved_predecessors(mut self, policy: UnresolvedPredecessorPolicy) -> Self {
        self.unresolved_predecessors = policy;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn strict() -> Self {
        Self::default().with_unresolved_predecessors(UnresolvedPredecessorPolicy::Reject)
    }

    pub fn runs_in_parallel(&self, level_width: usize) -> bool {
        self.parallel_threshold > 0 && level_width >= self.parallel_threshold
    }

    pub fn from_json_str(input: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            near_critical_threshold: Self::DEFAULT_NEAR_CRITICAL_THRESHOLD,
            unresolved_predecessors: UnresolvedPredecessorPolicy::Ignore,
            parallel_threshold: Self::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = ScheduleConfig::from_json_str(r#"{"near_critical_threshold": 3}"#).unwrap();
        assert_eq!(config.near_critical_threshold, 3);
        assert_eq!(
            config.unresolved_predecessors,
            UnresolvedPredecessorPolicy::Ignore
        );
        assert_eq!(
            config.parallel_threshold,
            ScheduleConfig::DEFAULT_PARALLEL_THRESHOLD
        );
    }

    #[test]
    fn policy_uses_snake_case() {
        let config =
            ScheduleConfig::from_json_str(r#"{"unresolved_predecessors": "reject"}"#).unwrap();
        assert_eq!(config, ScheduleConfig::strict());
    }

    #[test]
    fn zero_threshold_never_runs_in_parallel() {
        let config = ScheduleConfig::default().with_parallel_threshold(0);
        assert!(!config.runs_in_parallel(10_000));
        let config = ScheduleConfig::default().with_parallel_threshold(4);
        assert!(config.runs_in_parallel(4));
        assert!(!config.runs_in_parallel(3));
    }
}
