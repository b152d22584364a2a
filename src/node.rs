use crate::node_config::{Icon, NODE_SIZE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

/// A node in the flow graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier within the node set
    pub id: String,

    /// Node type selects handles and payload meaning
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Top-left corner on the canvas
    pub position: Position,

    /// Type-dependent payload
    #[serde(default)]
    pub data: NodeData,

    /// Size reported by the renderer, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Dimensions>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,

    /// Renderer fields this crate does not interpret, kept as written
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Create a node with a fresh id
    pub fn new(node_type: NodeType, position: Position, data: NodeData) -> Self {
        Self::with_id(Ulid::new().to_string(), node_type, position, data)
    }

    /// Create a node with a specific id (flows loaded from storage, tests)
    pub fn with_id(
        id: impl Into<String>,
        node_type: NodeType,
        position: Position,
        data: NodeData,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            position,
            data,
            measured: None,
            selected: false,
            extra: Map::new(),
        }
    }

    /// Build a node from the type registry, centered under `position`
    pub fn from_type(node_type: NodeType, position: Position) -> Self {
        let config = node_type.config();
        let data = NodeData {
            title: Some(config.title.to_string()),
            status: config.status,
            icon: Some(config.icon),
            tooltip: Some(config.tooltip.to_string()),
            ..NodeData::default()
        };

        Self::new(node_type, position.centered_on_node(), data)
    }

    /// Current display status, `Initial` when unset
    pub fn status(&self) -> NodeStatus {
        self.data.status.unwrap_or(NodeStatus::Initial)
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.data.status = Some(status);
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Title shown in run logs and markdown headings
    pub fn title(&self) -> &str {
        self.data.title.as_deref().unwrap_or("Untitled")
    }
}

/// Canvas coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Offset by another position
    pub fn offset(&self, by: Position) -> Position {
        Position::new(self.x + by.x, self.y + by.y)
    }

    /// Midpoint between two points
    pub fn midpoint(&self, other: &Position) -> Position {
        Position::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Top-left corner that places a nominal node centered on this point
    pub fn centered_on_node(&self) -> Position {
        Position::new(
            self.x - NODE_SIZE.width * 0.5,
            self.y - NODE_SIZE.height * 0.5,
        )
    }
}

/// Width and height of a node box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Node types available in the editor palette
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeType {
    #[serde(rename = "initial-node")]
    Initial,
    #[serde(rename = "transform-node")]
    Transform,
    #[serde(rename = "branch-node")]
    Branch,
    #[serde(rename = "join-node")]
    Join,
    #[serde(rename = "output-node")]
    Output,
    #[serde(rename = "markdown-node")]
    Markdown,
    #[serde(rename = "separator-node")]
    Separator,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Initial,
        NodeType::Transform,
        NodeType::Branch,
        NodeType::Join,
        NodeType::Output,
        NodeType::Markdown,
        NodeType::Separator,
    ];

    /// Document nodes switch the runner into markdown export
    pub fn is_document(&self) -> bool {
        matches!(self, NodeType::Markdown | NodeType::Separator)
    }
}

/// Display status of a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Loading,
    Success,
    Error,
    Initial,
}

/// Separator style for separator nodes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorKind {
    #[default]
    Line,
    Space,
    PageBreak,
}

/// Node payload; which fields matter depends on the node type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Markdown text (markdown nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Separator style (separator nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator_type: Option<SeparatorKind>,

    /// Parent node id when shown inside another node's child editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_of: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_expanded: Option<bool>,

    /// Child editor renders only the reference panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_panel_only: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    /// Payload for a markdown node
    pub fn markdown(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Payload for a separator node
    pub fn separator(kind: SeparatorKind) -> Self {
        Self {
            separator_type: Some(kind),
            ..Self::default()
        }
    }

    /// Payload carrying only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}
