use crate::{Dimensions, Edge, EventType, Node, Position};
use serde::{Deserialize, Serialize};

/// A single delta produced by the renderer for the node list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    Add {
        item: Node,
        #[serde(default)]
        index: Option<usize>,
    },
    Replace {
        id: String,
        item: Node,
    },
    Remove {
        id: String,
    },
    Position {
        id: String,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        dragging: Option<bool>,
    },
    Dimensions {
        id: String,
        #[serde(default)]
        dimensions: Option<Dimensions>,
    },
    Select {
        id: String,
        selected: bool,
    },
}

impl NodeChange {
    pub fn is_dimensions(&self) -> bool {
        matches!(self, NodeChange::Dimensions { .. })
    }
}

/// A single delta produced by the renderer for the edge list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Add {
        item: Edge,
        #[serde(default)]
        index: Option<usize>,
    },
    Replace {
        id: String,
        item: Edge,
    },
    Remove {
        id: String,
    },
    Select {
        id: String,
        selected: bool,
    },
}

/// Apply a batch of node changes in order.
///
/// Returns the structural effects (adds, replacements, removals) that
/// actually happened. Removals carry no cascaded edges; the store fills them.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &mut Vec<Node>) -> Vec<EventType> {
    let mut applied = Vec::new();

    for change in changes {
        match change {
            NodeChange::Add { item, index } => {
                match index {
                    Some(i) if *i <= nodes.len() => nodes.insert(*i, item.clone()),
                    _ => nodes.push(item.clone()),
                }
                applied.push(EventType::NodeAdded {
                    id: item.id.clone(),
                    node_type: item.node_type,
                });
            }
            NodeChange::Replace { id, item } => {
                if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                    *node = item.clone();
                    applied.push(EventType::NodeReplaced { id: id.clone() });
                }
            }
            NodeChange::Remove { id } => {
                let before = nodes.len();
                nodes.retain(|n| &n.id != id);
                if nodes.len() != before {
                    applied.push(EventType::NodeRemoved {
                        id: id.clone(),
                        cascaded_edges: Vec::new(),
                    });
                }
            }
            NodeChange::Position { id, position, .. } => {
                if let (Some(node), Some(position)) =
                    (nodes.iter_mut().find(|n| &n.id == id), position)
                {
                    node.set_position(*position);
                }
            }
            NodeChange::Dimensions { id, dimensions } => {
                if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                    if dimensions.is_some() {
                        node.measured = *dimensions;
                    }
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = nodes.iter_mut().find(|n| &n.id == id) {
                    node.selected = *selected;
                }
            }
        }
    }

    applied
}

/// Apply a batch of edge changes in order. Returns the structural effects.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &mut Vec<Edge>) -> Vec<EventType> {
    let mut applied = Vec::new();

    for change in changes {
        match change {
            EdgeChange::Add { item, index } => {
                match index {
                    Some(i) if *i <= edges.len() => edges.insert(*i, item.clone()),
                    _ => edges.push(item.clone()),
                }
                applied.push(EventType::EdgeAdded { id: item.id.clone() });
            }
            EdgeChange::Replace { id, item } => {
                if let Some(edge) = edges.iter_mut().find(|e| &e.id == id) {
                    *edge = item.clone();
                    applied.push(EventType::EdgeReplaced { id: id.clone() });
                }
            }
            EdgeChange::Remove { id } => {
                let before = edges.len();
                edges.retain(|e| &e.id != id);
                if edges.len() != before {
                    applied.push(EventType::EdgeRemoved { id: id.clone() });
                }
            }
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = edges.iter_mut().find(|e| &e.id == id) {
                    edge.selected = *selected;
                }
            }
        }
    }

    applied
}
