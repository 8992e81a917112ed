#[macro_use]
extern crate proptest;

use proptest::prelude::{Just, Strategy, prop};
use rustc_hash::FxHashSet;
use taskweave::compiler::compile;
use taskweave::loader::{load, parse_document};
use taskweave::model::{TaskNode, TaskPatch, WorkflowGraph};
use taskweave::types::{TaskStatus, TaskType};

// Generators shared by the document round-trip properties

/// Task ids: short lowercase alphanumerics, collected into a set so every
/// node id is unique.
fn task_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,8}").unwrap()
}

fn task_type_strategy() -> impl Strategy<Value = TaskType> {
    prop::sample::select(&[TaskType::Shell, TaskType::RestApi, TaskType::Email][..])
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(
        &[
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Failed,
        ][..],
    )
}

/// Arbitrary graphs over 1..8 nodes with 0..12 edges, endpoints drawn from
/// the node set (self-loops and duplicates included on purpose).
fn graph_strategy() -> impl Strategy<Value = WorkflowGraph> {
    prop::collection::btree_set(task_id_strategy(), 1..8)
        .prop_flat_map(|ids| {
            let ids: Vec<String> = ids.into_iter().collect();
            let n = ids.len();
            let types = prop::collection::vec(task_type_strategy(), n);
            let statuses = prop::collection::vec(status_strategy(), n);
            let edges = prop::collection::vec((0..n, 0..n), 0..12);
            (Just(ids), types, statuses, edges)
        })
        .prop_map(|(ids, types, statuses, edges)| {
            let mut graph = WorkflowGraph::new();
            for ((id, ty), status) in ids.iter().zip(types).zip(statuses) {
                let mut node = TaskNode::new(id.clone(), format!("Task {id}"), ty);
                node.apply(TaskPatch::new().status(status));
                graph.add_node(node);
            }
            for (s, t) in edges {
                graph.connect(ids[s].clone(), ids[t].clone());
            }
            graph
        })
}

proptest! {
    /// Every non-self-loop edge appears exactly once in its target's
    /// dependency list, and nothing else does.
    #[test]
    fn prop_dependency_lists_match_edges(graph in graph_strategy()) {
        let doc = compile(&graph, "prop", "");

        for task in &doc.tasks {
            let expected: FxHashSet<&str> = graph
                .edges()
                .iter()
                .filter(|e| e.target == task.id && !e.is_self_loop())
                .map(|e| e.source.as_str())
                .collect();
            let actual: FxHashSet<&str> =
                task.depends_on.iter().map(String::as_str).collect();

            prop_assert_eq!(&actual, &expected, "task {}", task.id);
            // Collapsed: no duplicates survive.
            prop_assert_eq!(actual.len(), task.depends_on.len());
            prop_assert!(!actual.contains(task.id.as_str()));
        }
    }
}

proptest! {
    /// Compile then load then compile reproduces the document exactly.
    #[test]
    fn prop_compile_load_compile_is_identity(graph in graph_strategy()) {
        let doc = compile(&graph, "prop", "round trip");
        let reloaded = load(&doc).unwrap();
        let doc2 = compile(&reloaded, "prop", "round trip");
        prop_assert_eq!(doc, doc2);
    }
}

proptest! {
    /// Loading the same document twice yields identical graphs; edge ids
    /// are derived, never invented.
    #[test]
    fn prop_load_is_idempotent(graph in graph_strategy()) {
        let doc = compile(&graph, "prop", "");
        let g1 = load(&doc).unwrap();
        let g2 = load(&doc).unwrap();
        prop_assert_eq!(&g1, &g2);

        for edge in g1.edges() {
            prop_assert_eq!(edge.id.clone(), format!("{}-{}", edge.source, edge.target));
        }
    }
}

proptest! {
    /// The completion aggregate is true exactly for non-empty graphs whose
    /// every task is COMPLETED, and it survives a round trip.
    #[test]
    fn prop_completion_aggregate(graph in graph_strategy()) {
        let expected = !graph.is_empty()
            && graph.nodes().iter().all(|n| n.status == TaskStatus::Completed);
        prop_assert_eq!(graph.all_completed(), expected);

        let reloaded = load(&compile(&graph, "prop", "")).unwrap();
        prop_assert_eq!(reloaded.all_completed(), expected);
    }
}

proptest! {
    /// Pretty-printing and re-parsing is lossless.
    #[test]
    fn prop_parse_inverts_serialization(graph in graph_strategy()) {
        let doc = compile(&graph, "prop", "serde");
        let parsed = parse_document(&doc.to_json_pretty().unwrap()).unwrap();
        prop_assert_eq!(doc, parsed);
    }
}
