//! Editable task nodes and their type-specific payloads.
//!
//! A [`TaskNode`] is the graph-side representation of one unit of work. Its
//! identity is fixed at construction; every other field is merged in place
//! through [`TaskPatch`], mirroring how the editing surface applies partial
//! updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{HttpMethod, Position, TaskStatus, TaskType};
use crate::utils::ids;

/// Descriptor for a single declared task output.
///
/// Serialized as `{"type": "file", "path": ...}` or
/// `{"type": "json", "json_path": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputSpec {
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    Json {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        json_path: Option<String>,
    },
}

impl OutputSpec {
    /// Convert this spec to the `json` kind, as required for REST task
    /// outputs. A `File` spec loses its path; the key is preserved by the
    /// caller.
    #[must_use]
    pub fn pinned_to_json(self) -> Self {
        match self {
            OutputSpec::Json { .. } => self,
            OutputSpec::File { .. } => OutputSpec::Json { json_path: None },
        }
    }
}

/// Mapping from output key to descriptor, ordered for stable serialization.
pub type OutputMap = BTreeMap<String, OutputSpec>;

/// Type-specific configuration, polymorphic over [`TaskType`].
///
/// EMAIL tasks do not expose outputs; SHELL outputs may be `file` or `json`;
/// REST outputs are pinned to `json` (see [`OutputSpec::pinned_to_json`]).
#[derive(Clone, Debug, PartialEq)]
pub enum TaskPayload {
    Shell {
        command: String,
        /// Name of an attached file, if any. The byte stream itself is a
        /// collaborator concern; only the reference travels with the node.
        file_name: Option<String>,
        outputs: OutputMap,
    },
    RestApi {
        method: HttpMethod,
        url: String,
        headers: BTreeMap<String, String>,
        outputs: OutputMap,
    },
    Email {
        subject: String,
        email_body: String,
        recipients: Vec<String>,
    },
}

impl TaskPayload {
    /// Empty payload for the given task type.
    #[must_use]
    pub fn empty(task_type: TaskType) -> Self {
        match task_type {
            TaskType::Shell => TaskPayload::Shell {
                command: String::new(),
                file_name: None,
                outputs: OutputMap::new(),
            },
            TaskType::RestApi => TaskPayload::RestApi {
                method: HttpMethod::default(),
                url: String::new(),
                headers: BTreeMap::new(),
                outputs: OutputMap::new(),
            },
            TaskType::Email => TaskPayload::Email {
                subject: String::new(),
                email_body: String::new(),
                recipients: Vec::new(),
            },
        }
    }

    /// The task type this payload belongs to.
    #[must_use]
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskPayload::Shell { .. } => TaskType::Shell,
            TaskPayload::RestApi { .. } => TaskType::RestApi,
            TaskPayload::Email { .. } => TaskType::Email,
        }
    }
}

/// One editable task node in the workflow graph.
///
/// Identity (`id`) is immutable once created; all other fields are mutable
/// in place via [`TaskPatch`] merges. `loading` is a transient
/// "awaiting runner acknowledgment" indicator and is independent of
/// `status`.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskNode {
    id: String,
    pub label: String,
    pub position: Position,
    pub payload: TaskPayload,
    /// Passthrough input mapping; preserved by compile/load, never
    /// interpreted by the core.
    pub inputs: BTreeMap<String, String>,
    pub status: TaskStatus,
    pub loading: bool,
    pub breakpoint: bool,
}

impl TaskNode {
    /// Create a node with an explicit id and an empty payload for the type.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position: Position::default(),
            payload: TaskPayload::empty(task_type),
            inputs: BTreeMap::new(),
            status: TaskStatus::Pending,
            loading: false,
            breakpoint: false,
        }
    }

    /// Spawn a fresh node of the given type at a canvas position, with a
    /// generated `"<TYPE>_<uuid>"` id and the type's default label.
    #[must_use]
    pub fn spawn(task_type: TaskType, position: Position) -> Self {
        let mut node = Self::new(ids::node_id(task_type), task_type.default_label(), task_type);
        node.position = position;
        node
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn task_type(&self) -> TaskType {
        self.payload.task_type()
    }

    /// Set the canvas position (builder-style).
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Merge a partial field set into this node.
    ///
    /// Payload fields that do not apply to the node's task type are ignored,
    /// matching last-writer-wins merge semantics on the editing surface.
    /// REST output specs are pinned to the `json` kind on the way in.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(loading) = patch.loading {
            self.loading = loading;
        }
        if let Some(breakpoint) = patch.breakpoint {
            self.breakpoint = breakpoint;
        }
        if let Some(inputs) = patch.inputs {
            self.inputs = inputs;
        }
        match &mut self.payload {
            TaskPayload::Shell {
                command,
                file_name,
                outputs,
            } => {
                if let Some(c) = patch.command {
                    *command = c;
                }
                if let Some(f) = patch.file_name {
                    *file_name = Some(f);
                }
                if let Some(o) = patch.outputs {
                    *outputs = o;
                }
            }
            TaskPayload::RestApi {
                method,
                url,
                headers,
                outputs,
            } => {
                if let Some(m) = patch.method {
                    *method = m;
                }
                if let Some(u) = patch.url {
                    *url = u;
                }
                if let Some(h) = patch.headers {
                    *headers = h;
                }
                if let Some(o) = patch.outputs {
                    *outputs = o
                        .into_iter()
                        .map(|(k, spec)| (k, spec.pinned_to_json()))
                        .collect();
                }
            }
            TaskPayload::Email {
                subject,
                email_body,
                recipients,
            } => {
                if let Some(s) = patch.subject {
                    *subject = s;
                }
                if let Some(b) = patch.email_body {
                    *email_body = b;
                }
                if let Some(r) = patch.recipients {
                    *recipients = r;
                }
            }
        }
    }

    /// Toggle the breakpoint marker, returning the new value.
    pub fn toggle_breakpoint(&mut self) -> bool {
        self.breakpoint = !self.breakpoint;
        self.breakpoint
    }
}

/// Partial field set merged into a [`TaskNode`] by [`TaskNode::apply`].
///
/// All fields are optional; absent fields leave the node untouched.
#[derive(Clone, Debug, Default)]
pub struct TaskPatch {
    pub label: Option<String>,
    pub position: Option<Position>,
    pub status: Option<TaskStatus>,
    pub loading: Option<bool>,
    pub breakpoint: Option<bool>,
    pub command: Option<String>,
    pub file_name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub outputs: Option<OutputMap>,
    pub subject: Option<String>,
    pub email_body: Option<String>,
    pub recipients: Option<Vec<String>>,
    pub inputs: Option<BTreeMap<String, String>>,
}

impl TaskPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    #[must_use]
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    #[must_use]
    pub fn recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = Some(recipients);
        self
    }
}

/// Build a recipient list from a comma-separated input, trimming whitespace
/// and discarding blanks.
///
/// ```
/// use taskweave::model::parse_recipients;
///
/// let r = parse_recipients("a@x.io, ,b@x.io,");
/// assert_eq!(r, vec!["a@x.io".to_string(), "b@x.io".to_string()]);
/// ```
#[must_use]
pub fn parse_recipients(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
