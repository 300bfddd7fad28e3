use crate::config::UnresolvedPredecessorPolicy;
use crate::error::{ScheduleError, ScheduleResult};
use crate::task::{DependencyType, Task, TaskId};
use crate::task_validation;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Edge weight: the typed constraint from predecessor (source) to successor (target).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyLink {
    pub dependency_type: DependencyType,
    pub lag: i64,
}

/// A predecessor id that matched no task and was dropped from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub task_id: TaskId,
    pub predecessor_id: TaskId,
}

/// Indexed view over a borrowed task slice, built once per computation.
///
/// Node `i` is the task at position `i` of the slice, so per-task results can
/// be stored in plain vectors indexed by `NodeIndex::index()`.
pub struct ScheduleDag<'a> {
    pub graph: DiGraph<&'a Task, DependencyLink>,
    pub id_to_index: HashMap<&'a str, NodeIndex>,
    pub unresolved: Vec<UnresolvedReference>,
}

impl<'a> ScheduleDag<'a> {
    /// Validates the tasks, then builds the graph.
    pub fn build(tasks: &'a [Task], policy: UnresolvedPredecessorPolicy) -> ScheduleResult<Self> {
        task_validation::validate_task_collection(tasks)?;
        Self::from_tasks(tasks, policy)
    }

    /// Builds the graph without validating durations or id uniqueness. With
    /// duplicate ids, edges resolve to the first task carrying the id.
    pub fn from_tasks(tasks: &'a [Task], policy: UnresolvedPredecessorPolicy) -> ScheduleResult<Self> {
        let edge_count = tasks.iter().map(|task| task.predecessors.len()).sum();
        let mut graph: DiGraph<&'a Task, DependencyLink> =
            DiGraph::with_capacity(tasks.len(), edge_count);
        let mut id_to_index: HashMap<&'a str, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut unresolved = Vec::new();

        // Add nodes first
        for task in tasks {
            let node_ix = graph.add_node(task);
            id_to_index.entry(task.id.as_str()).or_insert(node_ix);
        }

        // Add edges: pred -> task
        for (position, task) in tasks.iter().enumerate() {
            let task_ix = NodeIndex::new(position);
            for edge in &task.predecessors {
                match id_to_index.get(edge.predecessor_id.as_str()) {
                    Some(&pred_ix) => {
                        graph.add_edge(
                            pred_ix,
                            task_ix,
                            DependencyLink {
                                dependency_type: edge.dependency_type,
                                lag: edge.lag,
                            },
                        );
                    }
                    None => match policy {
                        UnresolvedPredecessorPolicy::Reject => {
                            return Err(ScheduleError::UnknownPredecessorReference {
                                task_id: task.id.clone(),
                                predecessor_id: edge.predecessor_id.clone(),
                            });
                        }
                        UnresolvedPredecessorPolicy::Ignore => {
                            warn!(
                                task = %task.id,
                                predecessor = %edge.predecessor_id,
                                "ignoring dependency on unknown task"
                            );
                            unresolved.push(UnresolvedReference {
                                task_id: task.id.clone(),
                                predecessor_id: edge.predecessor_id.clone(),
                            });
                        }
                    },
                }
            }
        }

        Ok(Self {
            graph,
            id_to_index,
            unresolved,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn task(&self, node: NodeIndex) -> &'a Task {
        self.graph[node]
    }

    pub fn duration(&self, node: NodeIndex) -> i64 {
        self.graph[node].duration
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    /// Predecessor edges of `node` as `(predecessor, link)`.
    pub fn incoming(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, DependencyLink)> + '_ {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (edge.source(), *edge.weight()))
    }

    /// Successor edges of `node` as `(successor, link)`.
    pub fn outgoing(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, DependencyLink)> + '_ {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.target(), *edge.weight()))
    }

    pub fn is_sink(&self, node: NodeIndex) -> bool {
        self.outgoing(node).next().is_none()
    }
}
