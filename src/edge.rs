use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Renderer edge type written on every new edge
pub const WORKFLOW_EDGE: &str = "workflow";

/// Directed connection between two node handles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Derived from the endpoints, see [`edge_id`]
    pub id: String,

    /// Node the edge leaves
    pub source: String,

    /// Node the edge enters
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,

    /// Renderer edge type, `workflow` for edges made by the editor
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,

    /// Renderer fields this crate does not interpret, kept as written
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Edge id for a pair of endpoints. Absent handles render as `null`.
pub fn edge_id(
    source: &str,
    source_handle: Option<&str>,
    target: &str,
    target_handle: Option<&str>,
) -> String {
    format!(
        "{}-{}-{}-{}",
        source,
        source_handle.unwrap_or("null"),
        target,
        target_handle.unwrap_or("null")
    )
}

impl Edge {
    /// Create an animated workflow edge with its derived id
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        let id = edge_id(
            &source,
            source_handle.as_deref(),
            &target,
            target_handle.as_deref(),
        );

        Self {
            id,
            source,
            target,
            source_handle,
            target_handle,
            edge_type: Some(WORKFLOW_EDGE.to_string()),
            animated: true,
            selected: false,
            extra: Map::new(),
        }
    }

    /// Edge between the default handles of two nodes
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, None, None)
    }

    /// Check if this edge touches a given node
    pub fn involves(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Same endpoints and handles, ignoring the id
    pub fn connects_same(&self, other: &Edge) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.source_handle == other.source_handle
            && self.target_handle == other.target_handle
    }
}

/// A completed drag from one handle to another
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl From<Connection> for Edge {
    fn from(connection: Connection) -> Self {
        Edge::new(
            connection.source,
            connection.target,
            connection.source_handle,
            connection.target_handle,
        )
    }
}
