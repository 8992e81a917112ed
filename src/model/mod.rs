//! Graph-side data model: task nodes, dependency edges, and the editable
//! graph container.
//!
//! The model layer is deliberately presentation-free. Canvas placement and
//! edge styling are carried opaquely so documents round-trip, but nothing in
//! this crate interprets them.

mod edge;
mod graph;
mod node;

pub use edge::{Edge, EdgeStyle, MarkerKind, derive_id};
pub use graph::{GraphController, WorkflowGraph};
pub use node::{OutputMap, OutputSpec, TaskNode, TaskPatch, TaskPayload, parse_recipients};
