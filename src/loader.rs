//! Document-to-graph loading (the compiler's inverse).
//!
//! [`load`] expands a workflow document's per-task dependency lists back
//! into edges and rebuilds editable nodes, so imported or previously
//! persisted documents become live graphs again. Loading is idempotent:
//! edge identity is derived from the endpoint pair, never stored.
//!
//! Mutation capabilities (merge-update, cascading delete) are not part of
//! the persisted model; they come from the environment via
//! [`GraphController`](crate::model::GraphController), which the returned
//! [`WorkflowGraph`] implements.

use miette::Diagnostic;
use rand::Rng;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::document::{CompiledTask, WorkflowDocument};
use crate::model::{TaskNode, TaskPayload, WorkflowGraph};
use crate::types::{Position, TaskType};

/// What to do with a `depends_on` entry that cannot be resolved against the
/// document's task set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DanglingPolicy {
    /// Fail the load; the prior graph state is left untouched by callers.
    #[default]
    Reject,
    /// Drop the dangling dependency and keep loading.
    Drop,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    pub dangling: DanglingPolicy,
}

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    /// Structurally invalid import input.
    #[error("malformed workflow document: {reason}")]
    #[diagnostic(
        code(taskweave::loader::malformed),
        help("The document must be a JSON object with a `tasks` array.")
    )]
    MalformedDocument { reason: String },

    /// A `depends_on` entry references an id absent from the task set.
    #[error("task `{task_id}` depends on unknown task `{dependency}`")]
    #[diagnostic(
        code(taskweave::loader::unresolved_dependency),
        help("Use DanglingPolicy::Drop to discard dangling dependencies instead.")
    )]
    UnresolvedDependency { task_id: String, dependency: String },
}

/// Parse raw JSON into a [`WorkflowDocument`].
///
/// A missing or ill-typed `tasks` field (and any other structural mismatch)
/// is reported as [`LoadError::MalformedDocument`].
pub fn parse_document(json: &str) -> Result<WorkflowDocument, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| LoadError::MalformedDocument {
            reason: e.to_string(),
        })?;
    match value.get("tasks") {
        None => {
            return Err(LoadError::MalformedDocument {
                reason: "missing `tasks` field".into(),
            });
        }
        Some(tasks) if !tasks.is_array() => {
            return Err(LoadError::MalformedDocument {
                reason: "`tasks` is not a list".into(),
            });
        }
        Some(_) => {}
    }
    serde_json::from_value(value).map_err(|e| LoadError::MalformedDocument {
        reason: e.to_string(),
    })
}

/// Load a document into an editable graph with the default
/// [`DanglingPolicy::Reject`].
pub fn load(doc: &WorkflowDocument) -> Result<WorkflowGraph, LoadError> {
    load_with(doc, &LoadOptions::default())
}

/// Load a document into an editable graph.
///
/// One node per task entry; tasks without a stored position get a
/// pseudo-random placement uniform in `[0, 500)` on both axes so legacy
/// documents remain usable. One edge is synthesized per resolvable
/// `depends_on` entry, with the shared default presentation.
pub fn load_with(doc: &WorkflowDocument, options: &LoadOptions) -> Result<WorkflowGraph, LoadError> {
    let known_ids: FxHashSet<&str> = doc.tasks.iter().map(|t| t.id.as_str()).collect();

    let mut graph = WorkflowGraph::new();
    for task in &doc.tasks {
        graph.add_node(node_from_task(task));
    }
    for task in &doc.tasks {
        for dependency in &task.depends_on {
            if known_ids.contains(dependency.as_str()) {
                graph.connect(dependency.clone(), task.id.clone());
            } else {
                match options.dangling {
                    DanglingPolicy::Reject => {
                        return Err(LoadError::UnresolvedDependency {
                            task_id: task.id.clone(),
                            dependency: dependency.clone(),
                        });
                    }
                    DanglingPolicy::Drop => {
                        tracing::warn!(
                            task = %task.id,
                            dependency = %dependency,
                            "dropping dangling dependency"
                        );
                    }
                }
            }
        }
    }
    Ok(graph)
}

fn node_from_task(task: &CompiledTask) -> TaskNode {
    let mut node = TaskNode::new(&task.id, &task.name, task.task_type);
    node.position = task.position.unwrap_or_else(random_position);
    node.status = task.status;
    node.loading = task.loading;
    node.breakpoint = task.breakpoint;
    node.inputs = task.inputs.clone().unwrap_or_default();

    node.payload = match task.task_type {
        TaskType::Shell => TaskPayload::Shell {
            command: task.command.clone().unwrap_or_default(),
            file_name: None,
            outputs: task.outputs.clone().unwrap_or_default(),
        },
        TaskType::RestApi => TaskPayload::RestApi {
            method: task.method.unwrap_or_default(),
            url: task.url.clone().unwrap_or_default(),
            headers: task.headers.clone().unwrap_or_default(),
            outputs: task
                .outputs
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|(k, spec)| (k, spec.pinned_to_json()))
                .collect(),
        },
        TaskType::Email => TaskPayload::Email {
            subject: task.subject.clone().unwrap_or_default(),
            email_body: task.email_body.clone().unwrap_or_default(),
            recipients: task.recipients.clone().unwrap_or_default(),
        },
    };
    node
}

/// Bounded canvas placement for documents that carry no coordinates.
fn random_position() -> Position {
    let mut rng = rand::rng();
    Position::new(rng.random_range(0.0..500.0), rng.random_range(0.0..500.0))
}
