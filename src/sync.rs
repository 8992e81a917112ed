//! Task status state machine and the workflow-completed aggregate.
//!
//! Inbound [`NodeUpdate`]s from the runner are merged into graph nodes here:
//! look the task up by id, merge whichever of `status`/`loading` the frame
//! carries, ignore unknown ids. The runner is authoritative and may
//! reference tasks added after document compilation, so an unknown id is
//! not an error.
//!
//! [`StatusSync`] also recomputes the derived workflow-completed aggregate
//! on every change and reports its false→true edge exactly once, re-arming
//! when any task regresses from `COMPLETED`.

use crate::model::{TaskPatch, WorkflowGraph};
use crate::session::NodeUpdate;

/// What one reconciliation step did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The update matched a node and its fields were merged.
    pub applied: bool,
    /// This update flipped the workflow-completed aggregate from false to
    /// true; fire the one-time success notification.
    pub completed: bool,
}

/// One-shot edge detector for "non-empty graph, every task COMPLETED".
///
/// Must not re-fire while already completed and must re-arm once any task
/// regresses.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionTracker {
    completed: bool,
}

impl CompletionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the aggregate; returns `true` only on the false→true edge.
    pub fn observe(&mut self, graph: &WorkflowGraph) -> bool {
        let all_completed = graph.all_completed();
        let fired = all_completed && !self.completed;
        self.completed = all_completed;
        fired
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

/// Per-task execution state machine driven by runner messages.
#[derive(Debug, Default)]
pub struct StatusSync {
    tracker: CompletionTracker,
}

impl StatusSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one inbound update into the graph and recompute the
    /// completion aggregate.
    pub fn apply(&mut self, graph: &mut WorkflowGraph, update: &NodeUpdate) -> SyncOutcome {
        let patch = TaskPatch {
            status: update.status,
            loading: update.loading,
            ..TaskPatch::default()
        };
        let applied = match graph.node_mut(&update.node_id) {
            Some(node) => {
                node.apply(patch);
                true
            }
            None => {
                tracing::debug!(node = %update.node_id, "status update for unknown task ignored");
                false
            }
        };
        SyncOutcome {
            applied,
            completed: self.tracker.observe(graph),
        }
    }

    /// Recompute the completion aggregate after an out-of-band graph
    /// change (an editor mutation rather than a runner frame). Returns
    /// `true` only on the false→true edge, like [`StatusSync::apply`].
    pub fn observe(&mut self, graph: &WorkflowGraph) -> bool {
        self.tracker.observe(graph)
    }

    #[must_use]
    pub fn is_workflow_completed(&self) -> bool {
        self.tracker.is_completed()
    }
}
