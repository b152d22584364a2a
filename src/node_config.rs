//! Static per-type node configuration: handles, titles, icons.
//!
//! Every [`NodeType`] has exactly one entry; lookups are exhaustive matches,
//! so adding a type without configuring it does not compile.

use crate::node::{Dimensions, NodeStatus, NodeType, Position};
use serde::{Deserialize, Serialize};

/// Nominal node box used for centering and handle placement
pub const NODE_SIZE: Dimensions = Dimensions {
    width: 260.0,
    height: 50.0,
};

/// Connection role of a handle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HandleRole {
    Source,
    Target,
}

impl HandleRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleRole::Source => "source",
            HandleRole::Target => "target",
        }
    }
}

/// Side of the node box a handle sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// A connection point declared by a node type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub id: Option<&'static str>,
    pub role: HandleRole,
    pub side: HandleSide,
    /// Offset from the node's top-left corner
    pub offset: Position,
}

const fn handle(
    id: Option<&'static str>,
    role: HandleRole,
    side: HandleSide,
    x: f64,
    y: f64,
) -> Handle {
    Handle {
        id,
        role,
        side,
        offset: Position { x, y },
    }
}

const CENTER_X: f64 = NODE_SIZE.width * 0.5;
const THIRD_X: f64 = NODE_SIZE.width / 3.0;
const TWO_THIRDS_X: f64 = NODE_SIZE.width - NODE_SIZE.width / 3.0;
const BOTTOM_Y: f64 = NODE_SIZE.height;

const SOURCE_BOTTOM: Handle = handle(None, HandleRole::Source, HandleSide::Bottom, CENTER_X, BOTTOM_Y);
const TARGET_TOP: Handle = handle(None, HandleRole::Target, HandleSide::Top, CENTER_X, 0.0);

static INITIAL_HANDLES: [Handle; 1] = [SOURCE_BOTTOM];
static PASS_THROUGH_HANDLES: [Handle; 2] = [SOURCE_BOTTOM, TARGET_TOP];
static OUTPUT_HANDLES: [Handle; 1] = [TARGET_TOP];
static JOIN_HANDLES: [Handle; 3] = [
    handle(Some("true"), HandleRole::Target, HandleSide::Top, TWO_THIRDS_X, 0.0),
    handle(Some("false"), HandleRole::Target, HandleSide::Top, THIRD_X, 0.0),
    SOURCE_BOTTOM,
];
static BRANCH_HANDLES: [Handle; 3] = [
    TARGET_TOP,
    handle(Some("true"), HandleRole::Source, HandleSide::Bottom, THIRD_X, BOTTOM_Y),
    handle(Some("false"), HandleRole::Source, HandleSide::Bottom, TWO_THIRDS_X, BOTTOM_Y),
];

/// Icon names understood by the palette renderer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Icon {
    Rocket,
    Spline,
    Split,
    Merge,
    CheckCheck,
    Ban,
    FileText,
    Minus,
}

/// Defaults applied when a node is created from the palette
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    pub node_type: NodeType,
    pub title: &'static str,
    pub status: Option<NodeStatus>,
    pub handles: &'static [Handle],
    pub icon: Icon,
    pub tooltip: &'static str,
}

impl NodeConfig {
    /// First handle with the given role, in declaration order
    pub fn first_handle(&self, role: HandleRole) -> Option<&'static Handle> {
        self.handles.iter().find(|h| h.role == role)
    }

    /// Which roles this type exposes
    pub fn capability(&self) -> HandleCapability {
        self.handles
            .iter()
            .fold(HandleCapability::None, |acc, h| acc.with(h.role))
    }
}

/// Handle roles exposed by a node type, reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleCapability {
    None,
    Source,
    Target,
    Both,
}

impl HandleCapability {
    fn with(self, role: HandleRole) -> Self {
        match (self, role) {
            (HandleCapability::None, HandleRole::Source) => HandleCapability::Source,
            (HandleCapability::None, HandleRole::Target) => HandleCapability::Target,
            (HandleCapability::Source, HandleRole::Source) => HandleCapability::Source,
            (HandleCapability::Target, HandleRole::Target) => HandleCapability::Target,
            _ => HandleCapability::Both,
        }
    }

    /// Role to exclude from a potential-connection query.
    ///
    /// `None` means no query should run at all; `Some(None)` means no role
    /// filter.
    pub fn query_role(&self) -> Option<Option<HandleRole>> {
        match self {
            HandleCapability::None => None,
            HandleCapability::Source => Some(Some(HandleRole::Source)),
            HandleCapability::Target => Some(Some(HandleRole::Target)),
            HandleCapability::Both => Some(None),
        }
    }
}

impl NodeType {
    /// Registry entry for this type
    pub fn config(&self) -> NodeConfig {
        match self {
            NodeType::Initial => NodeConfig {
                node_type: *self,
                title: "Initial Node",
                status: Some(NodeStatus::Initial),
                handles: &INITIAL_HANDLES,
                icon: Icon::Rocket,
                tooltip: "Starts your workflow and triggers the first action. Use this to begin any automated process or data pipeline.",
            },
            NodeType::Transform => NodeConfig {
                node_type: *self,
                title: "Transform Node",
                status: None,
                handles: &PASS_THROUGH_HANDLES,
                icon: Icon::Spline,
                tooltip: "Processes and modifies data as it flows through your workflow. Perfect for formatting text, converting data types, or applying calculations.",
            },
            NodeType::Join => NodeConfig {
                node_type: *self,
                title: "Join Node",
                status: Some(NodeStatus::Initial),
                handles: &JOIN_HANDLES,
                icon: Icon::Split,
                tooltip: "Combines multiple workflow paths back into a single flow. Use this to merge data from different branches or wait for multiple tasks to complete.",
            },
            NodeType::Branch => NodeConfig {
                node_type: *self,
                title: "Branch Node",
                status: Some(NodeStatus::Initial),
                handles: &BRANCH_HANDLES,
                icon: Icon::Merge,
                tooltip: "Creates different paths in your workflow based on conditions. Use this to send data down different routes depending on specific criteria or rules.",
            },
            NodeType::Output => NodeConfig {
                node_type: *self,
                title: "Output Node",
                status: None,
                handles: &OUTPUT_HANDLES,
                icon: Icon::CheckCheck,
                tooltip: "Completes your workflow and delivers the final result. Use this to save data, send notifications, or trigger external actions.",
            },
            NodeType::Markdown => NodeConfig {
                node_type: *self,
                title: "Markdown Node",
                status: None,
                handles: &PASS_THROUGH_HANDLES,
                icon: Icon::FileText,
                tooltip: "Create and edit markdown content, code snippets, or plain text. Each node represents a section of your document.",
            },
            NodeType::Separator => NodeConfig {
                node_type: *self,
                title: "Separator Node",
                status: None,
                handles: &PASS_THROUGH_HANDLES,
                icon: Icon::Minus,
                tooltip: "Adds a visual separator or line break between content sections in your markdown output.",
            },
        }
    }

    /// Static handles declared by this type
    pub fn handles(&self) -> &'static [Handle] {
        self.config().handles
    }
}
