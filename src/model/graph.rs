//! The editable workflow graph and its mutation capabilities.
//!
//! [`WorkflowGraph`] owns the node and edge collections in insertion order;
//! edge ordering is what makes dependency derivation deterministic under
//! compilation. Editor-wide mutation is expressed through the
//! [`GraphController`] trait so nodes and surfaces hold a capability, not a
//! back-reference to the container.

use rustc_hash::FxHashSet;

use super::edge::Edge;
use super::node::{TaskNode, TaskPatch};
use crate::types::TaskStatus;

/// Editor-wide mutation capability handed to collaborators that need to
/// update or delete tasks without owning the graph.
pub trait GraphController {
    /// Merge a partial field set into the task with the given id.
    /// Returns `false` when no such task exists.
    fn update_task(&mut self, id: &str, patch: TaskPatch) -> bool;

    /// Remove the task and every edge touching it.
    /// Returns `false` when no such task exists.
    fn delete_task(&mut self, id: &str) -> bool;
}

/// The editable representation: task nodes with free-form placement plus
/// directed dependency edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowGraph {
    nodes: Vec<TaskNode>,
    edges: Vec<Edge>,
}

impl WorkflowGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any existing node with the same id.
    pub fn add_node(&mut self, node: TaskNode) {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.id() == node.id()) {
            *existing = node;
        } else {
            self.nodes.push(node);
        }
    }

    /// Append a dependency edge `source -> target` with the derived id.
    ///
    /// Duplicates and self-loops are accepted here; the compiler collapses
    /// and excludes them respectively.
    pub fn connect(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.edges.push(Edge::new(source, target));
    }

    /// Append a prebuilt edge, preserving its presentation.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut TaskNode> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    #[must_use]
    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set of node ids currently present, for dependency resolution.
    #[must_use]
    pub fn node_ids(&self) -> FxHashSet<&str> {
        self.nodes.iter().map(TaskNode::id).collect()
    }

    /// Derived aggregate: `true` iff the graph is non-empty and every
    /// task's status is [`TaskStatus::Completed`].
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.nodes.is_empty()
            && self
                .nodes
                .iter()
                .all(|n| n.status == TaskStatus::Completed)
    }

    /// Discard every node and edge, starting a fresh workflow.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

impl GraphController for WorkflowGraph {
    fn update_task(&mut self, id: &str, patch: TaskPatch) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.apply(patch);
                true
            }
            None => false,
        }
    }

    fn delete_task(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id() != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, TaskType};

    fn shell(id: &str) -> TaskNode {
        TaskNode::new(id, "Shell Task", TaskType::Shell)
    }

    #[test]
    fn delete_cascades_to_touching_edges() {
        let mut g = WorkflowGraph::new();
        g.add_node(shell("A"));
        g.add_node(shell("B"));
        g.add_node(shell("C"));
        g.connect("A", "B");
        g.connect("B", "C");
        g.connect("A", "C");

        assert!(g.delete_task("B"));
        assert_eq!(g.nodes().len(), 2);
        assert_eq!(g.edges().len(), 1);
        assert_eq!(g.edges()[0].id, "A-C");
    }

    #[test]
    fn update_unknown_task_is_a_noop() {
        let mut g = WorkflowGraph::new();
        g.add_node(shell("A"));
        assert!(!g.update_task("missing", TaskPatch::new().label("x")));
        assert_eq!(g.node("A").unwrap().label, "Shell Task");
    }

    #[test]
    fn all_completed_requires_non_empty() {
        let mut g = WorkflowGraph::new();
        assert!(!g.all_completed());
        let mut a = shell("A");
        a.status = TaskStatus::Completed;
        g.add_node(a);
        assert!(g.all_completed());
        g.add_node(shell("B").at(Position::new(1.0, 2.0)));
        assert!(!g.all_completed());
    }
}
