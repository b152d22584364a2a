// Helper functions to build test graphs with various shapes
#![allow(dead_code)]

use flow_graph_editor::{
    Edge, GraphStore, Node, NodeData, NodeType, Position, SeparatorKind,
};

pub fn node(id: &str, node_type: NodeType, x: f64, y: f64) -> Node {
    Node::with_id(id, node_type, Position::new(x, y), NodeData::titled(id))
}

/// initial -> transform -> output, one layer apart
pub fn linear_flow() -> GraphStore {
    GraphStore::with_graph(
        vec![
            node("start", NodeType::Initial, 0.0, 0.0),
            node("work", NodeType::Transform, 0.0, 130.0),
            node("done", NodeType::Output, 0.0, 260.0),
        ],
        vec![Edge::between("start", "work"), Edge::between("work", "done")],
    )
}

/// initial -> branch -(true)-> transform -> join(true) -> output
///                   -(false)-----------> join(false)
pub fn branching_flow() -> GraphStore {
    GraphStore::with_graph(
        vec![
            node("start", NodeType::Initial, 0.0, 0.0),
            node("branch", NodeType::Branch, 0.0, 130.0),
            node("yes", NodeType::Transform, -150.0, 260.0),
            node("join", NodeType::Join, 0.0, 390.0),
            node("done", NodeType::Output, 0.0, 520.0),
        ],
        vec![
            Edge::between("start", "branch"),
            Edge::new("branch", "yes", Some("true".into()), None),
            Edge::new("branch", "join", Some("false".into()), Some("false".into())),
            Edge::new("yes", "join", None, Some("true".into())),
            Edge::between("join", "done"),
        ],
    )
}

/// Markdown document: intro, page break, body
pub fn document_flow() -> GraphStore {
    GraphStore::with_graph(
        vec![
            Node::with_id(
                "intro",
                NodeType::Markdown,
                Position::new(0.0, 0.0),
                NodeData::markdown("Intro", "Welcome."),
            ),
            Node::with_id(
                "break",
                NodeType::Separator,
                Position::new(0.0, 130.0),
                NodeData::separator(SeparatorKind::PageBreak),
            ),
            Node::with_id(
                "body",
                NodeType::Markdown,
                Position::new(0.0, 260.0),
                NodeData::markdown("Body", "Details."),
            ),
        ],
        vec![Edge::between("intro", "break"), Edge::between("break", "body")],
    )
}

/// Two nodes pointing at each other; no start node
pub fn cyclic_flow() -> GraphStore {
    GraphStore::with_graph(
        vec![
            node("a", NodeType::Transform, 0.0, 0.0),
            node("b", NodeType::Transform, 0.0, 130.0),
        ],
        vec![Edge::between("a", "b"), Edge::between("b", "a")],
    )
}
