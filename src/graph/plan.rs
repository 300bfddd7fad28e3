use super::schedule_dag::ScheduleDag;
use petgraph::graph::NodeIndex;

/// Topological order grouped into dependency levels.
///
/// A task's level is one more than the deepest level among its predecessors,
/// so every edge points from a lower level to a strictly higher one and the
/// tasks inside a level never constrain each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<NodeIndex>,
    levels: Vec<Vec<NodeIndex>>,
}

impl ExecutionPlan {
    /// `order` must be a topological order of `dag`.
    pub fn new(dag: &ScheduleDag<'_>, order: Vec<NodeIndex>) -> Self {
        let mut depth = vec![0usize; dag.node_count()];
        let mut levels: Vec<Vec<NodeIndex>> = Vec::new();

        for &node in &order {
            let level = dag
                .incoming(node)
                .map(|(pred, _)| depth[pred.index()] + 1)
                .max()
                .unwrap_or(0);
            depth[node.index()] = level;
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(node);
        }

        for level in &mut levels {
            level.sort_unstable();
        }

        Self { order, levels }
    }

    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }

    pub fn levels(&self) -> &[Vec<NodeIndex>] {
        &self.levels
    }

    /// Size of the widest level.
    pub fn width(&self) -> usize {
        self.levels.iter().map(Vec::len).max().unwrap_or(0)
    }
}
