//! Identifier generation for nodes and stored workflows.

use uuid::Uuid;

use crate::types::TaskType;

/// Generate a node id with the task-type prefix, e.g. `SHELL_<uuid>`.
///
/// The prefix keeps ids self-describing in serialized documents and runner
/// logs; uniqueness comes from the UUID.
#[must_use]
pub fn node_id(task_type: TaskType) -> String {
    format!("{task_type}_{}", Uuid::new_v4())
}

/// Generate an id for a newly persisted workflow.
#[must_use]
pub fn workflow_id() -> String {
    Uuid::new_v4().to_string()
}
