//! # Taskweave: Graph-to-Workflow Compiler and Runner Bridge
//!
//! Taskweave turns an editable task graph into a canonical JSON workflow
//! document, loads such documents back into editable graphs, and keeps the
//! graph's per-task execution status in sync with an external runner over a
//! duplex control channel.
//!
//! ## Core Concepts
//!
//! - **Graph**: Tasks plus directed edges, where an edge `A -> B` means
//!   `B` depends on `A`
//! - **Compiler**: Projects the graph into a [`document::WorkflowDocument`]
//!   with per-task `depends_on` lists
//! - **Loader**: The inverse projection, resynthesizing edges from the
//!   dependency lists
//! - **Session**: Exclusive control channel to the runner carrying
//!   `START`/`PAUSE`/`RESUME` frames out and `NODE_UPDATE` frames in
//! - **Sync**: Reconciles inbound status updates into the graph and tracks
//!   the all-tasks-completed aggregate
//!
//! ## Quick Start
//!
//! ### Building and Compiling a Graph
//!
//! ```
//! use taskweave::compiler::compile;
//! use taskweave::model::{TaskNode, TaskPatch, WorkflowGraph};
//! use taskweave::types::TaskType;
//!
//! let mut graph = WorkflowGraph::new();
//! let mut fetch = TaskNode::new("fetch", "Fetch Data", TaskType::RestApi);
//! fetch.apply(TaskPatch::new().url("https://example.com/api"));
//! graph.add_node(fetch);
//! graph.add_node(TaskNode::new("report", "Send Report", TaskType::Email));
//! graph.connect("fetch", "report");
//!
//! let doc = compile(&graph, "Nightly Report", "Fetch then mail");
//! let report = doc.task("report").unwrap();
//! assert_eq!(report.depends_on, vec!["fetch".to_string()]);
//! ```
//!
//! ### Round-Tripping a Document
//!
//! ```
//! use taskweave::compiler::compile;
//! use taskweave::loader::load;
//! use taskweave::model::{TaskNode, WorkflowGraph};
//! use taskweave::types::TaskType;
//!
//! let mut graph = WorkflowGraph::new();
//! graph.add_node(TaskNode::new("a", "A", TaskType::Shell));
//! graph.add_node(TaskNode::new("b", "B", TaskType::Shell));
//! graph.connect("a", "b");
//!
//! let doc = compile(&graph, "Pipeline", "");
//! let reloaded = load(&doc).unwrap();
//! assert_eq!(reloaded.edges().len(), 1);
//! assert_eq!(reloaded.edges()[0].id, "a-b");
//! ```
//!
//! ### Running Against a Runner
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use taskweave::config::RunnerConfig;
//! use taskweave::store::{InMemoryStore, StaticIdentity};
//! use taskweave::types::{Position, TaskType};
//! use taskweave::workbench::Workbench;
//!
//! # async fn demo() -> miette::Result<()> {
//! let config = RunnerConfig::default();
//! let store = Arc::new(InMemoryStore::new());
//! let identity = Arc::new(StaticIdentity::new("user-1"));
//! let mut bench = Workbench::with_config(&config, store, identity);
//!
//! bench.add_task(TaskType::Shell, Position { x: 40.0, y: 80.0 });
//! bench.run().await?;
//! bench.apply_pending_updates();
//! for notice in bench.notices().drain() {
//!     eprintln!("{notice}");
//! }
//! bench.teardown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - Task type, status, and position primitives
//! - [`model`] - Editable graph: nodes, edges, and mutation operations
//! - [`document`] - Canonical workflow document types
//! - [`compiler`] - Graph to document projection
//! - [`loader`] - Document to graph projection
//! - [`session`] - Runner control channel and wire protocol
//! - [`sync`] - Inbound status reconciliation and completion tracking
//! - [`workbench`] - Editing-session facade tying the pieces together
//! - [`store`] - Workflow persistence keyed by user and workflow id
//! - [`notices`] - User-facing notification bus with pluggable sinks

pub mod compiler;
pub mod config;
pub mod document;
pub mod loader;
pub mod model;
pub mod notices;
pub mod session;
pub mod store;
pub mod sync;
pub mod telemetry;
pub mod types;
pub mod utils;
pub mod workbench;
