//! Dependency edges between task nodes.
//!
//! Edges are stored with source/target ids but are semantically directed
//! `source -> target`, meaning "target depends on source". Edge identity is
//! a pure function of the endpoint pair; it is derived, never persisted, so
//! re-loading the same document yields the same ids.

use serde::{Deserialize, Serialize};

/// End-of-edge marker shape, serialized for the editing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    #[default]
    ArrowClosed,
}

/// Shared default edge presentation: animated with a closed-arrow marker.
///
/// Preserved for collaborators (the canvas), never interpreted by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub animated: bool,
    pub marker_end: MarkerKind,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            animated: true,
            marker_end: MarkerKind::ArrowClosed,
        }
    }
}

/// A directed dependency edge: `target` depends on `source`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl Edge {
    /// Create an edge with the derived `"<source>-<target>"` id and the
    /// default presentation.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: derive_id(&source, &target),
            source,
            target,
            style: EdgeStyle::default(),
        }
    }

    /// Returns `true` when both endpoints reference the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Edge id as a pure function of the ordered endpoint pair.
#[must_use]
pub fn derive_id(source: &str, target: &str) -> String {
    format!("{source}-{target}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_derived_from_endpoints() {
        let e = Edge::new("A", "B");
        assert_eq!(e.id, "A-B");
        assert_eq!(Edge::new("A", "B"), e);
    }

    #[test]
    fn default_style_is_animated_arrow() {
        let e = Edge::new("A", "A");
        assert!(e.is_self_loop());
        assert!(e.style.animated);
        assert_eq!(e.style.marker_end, MarkerKind::ArrowClosed);
    }
}
