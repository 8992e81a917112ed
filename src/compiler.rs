//! Graph-to-document compilation.
//!
//! [`compile`] derives, for every node, its ordered predecessor list from
//! the edge collection and assembles the canonical [`WorkflowDocument`].
//! It is pure and side-effect-free, so the editing surface can re-run it on
//! every edit for a live preview.
//!
//! The default entry point is deliberately permissive: edges referencing
//! missing nodes pass through and cycles are not rejected, leaving
//! validation to the runner. Both strictures are available through
//! [`CompileOptions`] and [`compile_with`].

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::document::{CompiledTask, WorkflowDocument};
use crate::model::{TaskNode, TaskPayload, WorkflowGraph};

/// Opt-in validation behaviors for [`compile_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileOptions {
    /// Drop edges whose source or target id is absent from the node set.
    pub drop_dangling_edges: bool,
    /// Fail with [`CompileError::CycleDetected`] when the collapsed
    /// dependency relation is not a DAG.
    pub reject_cycles: bool,
}

#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error("dependency cycle detected involving task `{task_id}`")]
    #[diagnostic(
        code(taskweave::compiler::cycle),
        help("Remove one of the edges forming the cycle; the runner contract assumes an acyclic graph.")
    )]
    CycleDetected { task_id: String },
}

/// Compile the graph into a canonical workflow document.
///
/// Permissive and infallible: any well-formed graph produces a document,
/// including graphs with cycles or edges referencing missing node ids.
/// Self-loops never contribute a dependency entry.
///
/// # Examples
///
/// ```
/// use taskweave::compiler::compile;
/// use taskweave::model::{TaskNode, TaskPatch, WorkflowGraph};
/// use taskweave::types::TaskType;
///
/// let mut g = WorkflowGraph::new();
/// g.add_node(TaskNode::new("A", "Shell Task", TaskType::Shell));
/// g.add_node(TaskNode::new("B", "Shell Task", TaskType::Shell));
/// g.connect("A", "B");
///
/// let doc = compile(&g, "demo", "");
/// assert_eq!(doc.task("B").unwrap().depends_on, vec!["A".to_string()]);
/// ```
#[must_use]
pub fn compile(
    graph: &WorkflowGraph,
    workflow_name: impl Into<String>,
    description: impl Into<String>,
) -> WorkflowDocument {
    match compile_with(graph, workflow_name, description, &CompileOptions::default()) {
        Ok(doc) => doc,
        // Default options have no failure paths.
        Err(_) => unreachable!("permissive compilation is infallible"),
    }
}

/// Compile with explicit validation options.
pub fn compile_with(
    graph: &WorkflowGraph,
    workflow_name: impl Into<String>,
    description: impl Into<String>,
    options: &CompileOptions,
) -> Result<WorkflowDocument, CompileError> {
    let known_ids = graph.node_ids();

    // One pass over the edge collection builds every node's predecessor
    // list in insertion order, duplicates collapsed.
    let mut depends_on: FxHashMap<&str, Vec<String>> = FxHashMap::default();
    let mut seen: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
    for edge in graph.edges() {
        if edge.is_self_loop() {
            continue;
        }
        if options.drop_dangling_edges
            && !(known_ids.contains(edge.source.as_str()) && known_ids.contains(edge.target.as_str()))
        {
            tracing::debug!(edge = %edge.id, "dropping edge with unresolved endpoint");
            continue;
        }
        if seen
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str())
        {
            depends_on
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.clone());
        }
    }

    if options.reject_cycles {
        check_acyclic(graph, &depends_on)?;
    }

    let mut doc = WorkflowDocument::new(workflow_name, description);
    doc.tasks = graph
        .nodes()
        .iter()
        .map(|node| compile_task(node, depends_on.remove(node.id()).unwrap_or_default()))
        .collect();
    Ok(doc)
}

fn compile_task(node: &TaskNode, depends_on: Vec<String>) -> CompiledTask {
    let mut task = CompiledTask::new(node.id(), node.label.clone(), node.task_type());
    task.status = node.status;
    task.loading = node.loading;
    task.breakpoint = node.breakpoint;
    task.depends_on = depends_on;
    task.position = Some(node.position);
    if !node.inputs.is_empty() {
        task.inputs = Some(node.inputs.clone());
    }

    // Type-specific fields are included only when set; omission keeps the
    // serialized form compact.
    match &node.payload {
        TaskPayload::Shell {
            command, outputs, ..
        } => {
            if !command.is_empty() {
                task.command = Some(command.clone());
            }
            if !outputs.is_empty() {
                task.outputs = Some(outputs.clone());
            }
        }
        TaskPayload::RestApi {
            method,
            url,
            headers,
            outputs,
        } => {
            task.method = Some(*method);
            if !url.is_empty() {
                task.url = Some(url.clone());
            }
            if !headers.is_empty() {
                task.headers = Some(headers.clone());
            }
            if !outputs.is_empty() {
                task.outputs = Some(outputs.clone());
            }
        }
        TaskPayload::Email {
            subject,
            email_body,
            recipients,
        } => {
            if !subject.is_empty() {
                task.subject = Some(subject.clone());
            }
            if !email_body.is_empty() {
                task.email_body = Some(email_body.clone());
            }
            if !recipients.is_empty() {
                task.recipients = Some(recipients.clone());
            }
        }
    }
    task
}

/// Kahn-style elimination over the collapsed dependency relation.
/// Dependencies referencing ids outside the node set never block a task.
fn check_acyclic(
    graph: &WorkflowGraph,
    depends_on: &FxHashMap<&str, Vec<String>>,
) -> Result<(), CompileError> {
    let known_ids = graph.node_ids();
    let mut remaining: FxHashMap<&str, FxHashSet<&str>> = graph
        .nodes()
        .iter()
        .map(|n| {
            let deps: FxHashSet<&str> = depends_on
                .get(n.id())
                .map(|d| {
                    d.iter()
                        .map(String::as_str)
                        .filter(|s| known_ids.contains(s))
                        .collect()
                })
                .unwrap_or_default();
            (n.id(), deps)
        })
        .collect();

    loop {
        let ready: Vec<&str> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| *id)
            .collect();
        if ready.is_empty() {
            break;
        }
        for id in &ready {
            remaining.remove(id);
        }
        for deps in remaining.values_mut() {
            for id in &ready {
                deps.remove(id);
            }
        }
    }

    match remaining.keys().next() {
        None => Ok(()),
        Some(id) => Err(CompileError::CycleDetected {
            task_id: (*id).to_string(),
        }),
    }
}
