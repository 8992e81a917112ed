//! Canonical, serializable workflow documents.
//!
//! These are explicit serde-friendly shapes decoupled from the in-memory
//! graph model: the compiler produces them, the loader consumes them, and
//! collaborators (runner, store, import/export surface) exchange them as
//! JSON. Optional type-specific fields are omitted when absent, never
//! serialized as null; that compactness is what the round-trip guarantee is
//! stated against.
//!
//! This module intentionally does NOT perform I/O. It is pure data shape
//! and (de)serialization glue.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::OutputMap;
use crate::types::{HttpMethod, Position, TaskStatus, TaskType};

/// Document format version emitted by this crate.
pub const DOCUMENT_VERSION: &str = "1.0";

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// One task entry in a [`WorkflowDocument`].
///
/// `depends_on` lists ids of tasks this task waits for, in edge insertion
/// order with duplicates collapsed. Type-specific fields are present only
/// if they were set on the source node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledTask {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub breakpoint: bool,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    // SHELL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    // RESTAPI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    // SHELL | RESTAPI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputMap>,

    // EMAIL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(
        rename = "emailBody",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub email_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,

    // All types, opaque passthrough.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, String>>,
}

impl CompiledTask {
    /// Bare task entry with mandatory fields only.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            task_type,
            status: TaskStatus::default(),
            loading: false,
            breakpoint: false,
            depends_on: Vec::new(),
            position: None,
            command: None,
            method: None,
            url: None,
            headers: None,
            outputs: None,
            subject: None,
            email_body: None,
            recipients: None,
            inputs: None,
        }
    }
}

/// The canonical workflow document exchanged with the runner and the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub workflow_name: String,
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub tasks: Vec<CompiledTask>,
}

impl WorkflowDocument {
    #[must_use]
    pub fn new(workflow_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            description: description.into(),
            version: default_version(),
            tasks: Vec::new(),
        }
    }

    /// Serialize as the pretty-printed JSON used for the live preview,
    /// export files, and the `START` control frame.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a task entry by id.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&CompiledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }
}
