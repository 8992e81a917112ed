//! Wire types for the runner control channel.
//!
//! Client-to-runner frames carry a `type` discriminator (`START`, `PAUSE`,
//! `RESUME`); `START` embeds the serialized workflow document as a string.
//! Runner-to-client frames are `NODE_UPDATE` status events.

use serde::{Deserialize, Serialize};

use crate::types::TaskStatus;

/// Client → runner control frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Begin executing the embedded workflow document.
    #[serde(rename = "START")]
    Start {
        /// The serialized [`WorkflowDocument`](crate::document::WorkflowDocument),
        /// carried as a JSON string rather than a nested object.
        workflow: String,
    },
    #[serde(rename = "PAUSE")]
    Pause,
    #[serde(rename = "RESUME")]
    Resume,
}

/// Runner → client status frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StatusMessage {
    #[serde(rename = "NODE_UPDATE")]
    NodeUpdate(NodeUpdate),
}

/// Per-task status and/or loading change reported by the runner.
///
/// Fields other than the id are optional; the state machine merges only
/// what is present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<bool>,
}

impl NodeUpdate {
    #[must_use]
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            status: None,
            loading: None,
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_frame_shape() {
        let frame = ControlMessage::Start {
            workflow: "{}".into(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "START");
        assert_eq!(json["workflow"], "{}");

        let pause = serde_json::to_string(&ControlMessage::Pause).unwrap();
        assert_eq!(pause, r#"{"type":"PAUSE"}"#);
    }

    #[test]
    fn node_update_parses_wire_format() {
        let msg: StatusMessage = serde_json::from_str(
            r#"{"type":"NODE_UPDATE","nodeId":"A","status":"RUNNING","loading":true}"#,
        )
        .unwrap();
        let StatusMessage::NodeUpdate(update) = msg;
        assert_eq!(update.node_id, "A");
        assert_eq!(update.status, Some(TaskStatus::Running));
        assert_eq!(update.loading, Some(true));
    }
}
