use crate::{LayoutMode, NodeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A store mutation with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Structural changes recorded by the graph store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventType {
    NodeAdded {
        id: String,
        node_type: NodeType,
    },

    NodeRemoved {
        id: String,
        cascaded_edges: Vec<String>,
    },

    /// Node swapped wholesale by a renderer change batch
    NodeReplaced {
        id: String,
    },

    EdgeAdded {
        id: String,
    },

    EdgeRemoved {
        id: String,
    },

    EdgeReplaced {
        id: String,
    },

    NodesReplaced {
        count: usize,
    },

    EdgesReplaced {
        count: usize,
    },

    LayoutModeChanged {
        mode: LayoutMode,
    },

    LayoutApplied {
        seq: u64,
    },

    /// A layout result arrived after a newer request or a structural edit
    LayoutDiscarded {
        seq: u64,
    },
}
