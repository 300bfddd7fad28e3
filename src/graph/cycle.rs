//! Cycle detection and topological ordering.
//!
//! A single depth-first traversal serves both purposes: it either finds a
//! task that is still on the current path (a cycle) or finishes every task,
//! in which case the reverse post-order is a topological order. The traversal
//! keeps its own stack, so deep chains cannot overflow the call stack.

use super::schedule_dag::ScheduleDag;
use crate::config::UnresolvedPredecessorPolicy;
use crate::error::{ScheduleError, ScheduleResult};
use crate::network::TaskNetwork;
use crate::task::TaskId;
use petgraph::Direction;
use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Returns the tasks in topological order (every task after all of its
/// predecessors), or the first cycle found as an ordered list of nodes.
pub fn try_topological_order(dag: &ScheduleDag<'_>) -> Result<Vec<NodeIndex>, Vec<NodeIndex>> {
    let graph = &dag.graph;
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut post_order = Vec::with_capacity(graph.node_count());
    let mut stack = Vec::new();

    for start in graph.node_indices() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        marks[start.index()] = Mark::OnPath;
        stack.push((start, graph.neighbors_directed(start, Direction::Outgoing)));

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let node = frame.0;
            let next = frame.1.next();
            match next {
                Some(next) => match marks[next.index()] {
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnPath;
                        stack.push((next, graph.neighbors_directed(next, Direction::Outgoing)));
                    }
                    Mark::OnPath => {
                        let entry = stack
                            .iter()
                            .position(|(on_path, _)| *on_path == next)
                            .unwrap_or(0);
                        return Err(stack[entry..].iter().map(|(n, _)| *n).collect());
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[node.index()] = Mark::Done;
                    post_order.push(node);
                    stack.pop();
                }
            }
        }
    }

    post_order.reverse();
    Ok(post_order)
}

/// Same as [`try_topological_order`], with the cycle mapped to task ids.
pub fn topological_order(dag: &ScheduleDag<'_>) -> ScheduleResult<Vec<NodeIndex>> {
    try_topological_order(dag).map_err(|cycle| ScheduleError::CycleDetected {
        cycle: cycle
            .into_iter()
            .map(|node| dag.task(node).id.clone())
            .collect(),
    })
}

/// Checks a network for dependency cycles without scheduling it.
///
/// Dangling predecessor references are skipped and durations are not
/// validated; only the graph structure matters here.
pub fn detect_cycle(network: &TaskNetwork) -> Option<Vec<TaskId>> {
    let dag = ScheduleDag::from_tasks(network.tasks(), UnresolvedPredecessorPolicy::Ignore).ok()?;
    match topological_order(&dag) {
        Err(ScheduleError::CycleDetected { cycle }) => Some(cycle),
        _ => None,
    }
}
