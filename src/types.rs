//! Core types for the taskweave workflow model.
//!
//! This module defines the fundamental enums shared across the compiler,
//! loader, and execution-session layers: what kind of work a task performs,
//! where a task is in its lifecycle, and the canvas position that travels
//! with it through serialization.
//!
//! # Examples
//!
//! ```rust
//! use taskweave::types::{TaskStatus, TaskType};
//!
//! let t: TaskType = "SHELL".into();
//! assert_eq!(t, TaskType::Shell);
//! assert_eq!(t.to_string(), "SHELL");
//!
//! assert_eq!(TaskStatus::default(), TaskStatus::Pending);
//! assert!(TaskStatus::Completed.is_terminal());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of work a task performs.
///
/// Serialized in SCREAMING-CASE (`"SHELL"`, `"RESTAPI"`, `"EMAIL"`) to match
/// the canonical document format consumed by the runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Run a shell command.
    #[serde(rename = "SHELL")]
    Shell,
    /// Perform an HTTP request against a REST endpoint.
    #[serde(rename = "RESTAPI")]
    RestApi,
    /// Send an email.
    #[serde(rename = "EMAIL")]
    Email,
}

impl TaskType {
    /// Default display label for a freshly spawned task of this type.
    #[must_use]
    pub fn default_label(&self) -> &'static str {
        match self {
            TaskType::Shell => "Shell Task",
            TaskType::RestApi => "RestApi Task",
            TaskType::Email => "Email Task",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell => write!(f, "SHELL"),
            Self::RestApi => write!(f, "RESTAPI"),
            Self::Email => write!(f, "EMAIL"),
        }
    }
}

// Developer Experience: allow using the wire strings where a TaskType is expected.
impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        match s {
            "RESTAPI" => TaskType::RestApi,
            "EMAIL" => TaskType::Email,
            _ => TaskType::Shell,
        }
    }
}

/// Per-task execution lifecycle state.
///
/// The runner drives `Pending -> Running -> {Completed, Failed}`. `Running`
/// is also reachable again from the terminal states when the runner restarts
/// a task; there is no hard terminal lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Returns `true` for [`Completed`](Self::Completed) and
    /// [`Failed`](Self::Failed).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// HTTP method for a [`TaskType::RestApi`] task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Free-form 2D canvas placement.
///
/// Presentation-only: preserved through compile/load round-trips but never
/// interpreted by the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
