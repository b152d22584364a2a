use crate::changes::{apply_edge_changes, apply_node_changes};
use crate::connection::{ConnectionSiteIndex, PotentialConnection, PotentialConnectionQuery};
use crate::{
    Connection, Edge, EdgeChange, EventType, GraphEvent, HandleRole, Node, NodeChange,
    NodeStatus, NodeType, Position,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Store handle shared between the editor, runner and CLI.
/// Never hold the lock across an `.await`.
pub type SharedStore = Arc<Mutex<GraphStore>>;

/// Whether dimension changes trigger a full re-layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Fixed,
    #[default]
    Free,
}

impl LayoutMode {
    pub fn toggled(&self) -> Self {
        match self {
            LayoutMode::Fixed => LayoutMode::Free,
            LayoutMode::Free => LayoutMode::Fixed,
        }
    }
}

/// Nodes, edges and layout mode
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphState {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub layout_mode: LayoutMode,
}

/// Identifies one layout request; results are only applied for the latest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTicket {
    pub seq: u64,
    revision: u64,
}

/// Snapshot handed to a layout adapter
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub ticket: LayoutTicket,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Arguments for inserting a node onto an edge or free handle
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBetween {
    pub node_type: NodeType,
    pub source: Option<String>,
    pub target: Option<String>,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub position: Position,
}

impl InsertBetween {
    /// Insert at a snapped connection site
    pub fn at(node_type: NodeType, connection: &PotentialConnection) -> Self {
        Self {
            node_type,
            source: connection.source.as_ref().map(|h| h.node.clone()),
            target: connection.target.as_ref().map(|h| h.node.clone()),
            source_handle: connection.source.as_ref().and_then(|h| h.handle.clone()),
            target_handle: connection.target.as_ref().and_then(|h| h.handle.clone()),
            position: connection.position,
        }
    }
}

/// Single owner of the editable graph.
///
/// Every structural edit goes through these methods. Operations never fail:
/// unknown ids are ignored.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    state: GraphState,

    /// Nodes in the current drag gesture
    dragged_nodes: HashMap<String, Node>,

    /// Rebuilt on demand after any graph mutation
    connection_sites: Option<ConnectionSiteIndex>,

    potential_connection: Option<PotentialConnection>,

    /// Last issued layout request
    layout_seq: u64,

    /// Bumped whenever the node set itself changes
    revision: u64,

    events: Vec<GraphEvent>,
}

impl GraphStore {
    /// Create an empty store in free layout mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with a graph
    pub fn with_graph(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            state: GraphState {
                nodes,
                edges,
                layout_mode: LayoutMode::Free,
            },
            ..Self::default()
        }
    }

    /// Move the store behind a shared lock
    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // ========== Accessors ==========

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn nodes(&self) -> &[Node] {
        &self.state.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.state.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.state.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.state.edges.iter().find(|e| e.id == id)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.state.layout_mode
    }

    pub fn potential_connection(&self) -> Option<&PotentialConnection> {
        self.potential_connection.as_ref()
    }

    pub fn dragged_nodes(&self) -> &HashMap<String, Node> {
        &self.dragged_nodes
    }

    /// Edges leaving a node, in edge-list order
    pub fn outgoing_edges(&self, id: &str) -> Vec<&Edge> {
        self.state.edges.iter().filter(|e| e.source == id).collect()
    }

    /// Edges entering a node, in edge-list order
    pub fn incoming_edges(&self, id: &str) -> Vec<&Edge> {
        self.state.edges.iter().filter(|e| e.target == id).collect()
    }

    /// First node in list order without incoming edges
    pub fn start_node(&self) -> Option<&Node> {
        self.state
            .nodes
            .iter()
            .find(|n| !self.state.edges.iter().any(|e| e.target == n.id))
    }

    // ========== Node Operations ==========

    /// Replace all nodes
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        let count = nodes.len();
        self.state.nodes = nodes;
        self.structure_changed();
        self.log_event(EventType::NodesReplaced { count });
    }

    /// Append a node. The caller supplies a fresh id.
    pub fn add_node(&mut self, node: Node) {
        debug!(id = %node.id, node_type = ?node.node_type, "adding node");

        self.log_event(EventType::NodeAdded {
            id: node.id.clone(),
            node_type: node.node_type,
        });

        self.state.nodes.push(node);
        self.structure_changed();
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) {
        let before = self.state.nodes.len();
        self.state.nodes.retain(|n| n.id != id);
        if self.state.nodes.len() == before {
            return;
        }

        let cascaded_edges = self.remove_incident_edges(id);
        debug!(id, cascaded = cascaded_edges.len(), "removed node");

        self.dragged_nodes.remove(id);
        self.structure_changed();
        self.log_event(EventType::NodeRemoved {
            id: id.to_string(),
            cascaded_edges,
        });
    }

    /// Create a node from the type registry centered under `position`
    pub fn add_node_by_type(&mut self, node_type: NodeType, position: Position) -> String {
        let node = Node::from_type(node_type, position);
        let id = node.id.clone();
        self.add_node(node);
        id
    }

    /// Insert a new node, splitting the edge between `source` and `target`.
    ///
    /// The upstream link is only recreated if the new type has a target
    /// handle, the downstream link only if it has a source handle.
    pub fn add_node_in_between(&mut self, insert: InsertBetween) -> String {
        let new_id = self.add_node_by_type(insert.node_type, insert.position);

        if let (Some(source), Some(target)) = (&insert.source, &insert.target) {
            let split = crate::edge_id(
                source,
                insert.source_handle.as_deref(),
                target,
                insert.target_handle.as_deref(),
            );
            self.remove_edge(&split);
        }

        let config = insert.node_type.config();
        let node_target = config.first_handle(HandleRole::Target);
        let node_source = config.first_handle(HandleRole::Source);

        if let (Some(handle), Some(source)) = (node_target, insert.source) {
            self.add_edge(Edge::new(
                source,
                new_id.clone(),
                insert.source_handle,
                handle.id.map(str::to_string),
            ));
        }

        if let (Some(handle), Some(target)) = (node_source, insert.target) {
            self.add_edge(Edge::new(
                new_id.clone(),
                target,
                handle.id.map(str::to_string),
                insert.target_handle,
            ));
        }

        new_id
    }

    /// Drop a palette item: snap onto the potential connection if one is set
    pub fn drop_node(&mut self, node_type: NodeType, position: Position) -> String {
        let id = match self.potential_connection.take() {
            Some(connection) => self.add_node_in_between(InsertBetween::at(node_type, &connection)),
            None => self.add_node_by_type(node_type, position),
        };
        self.potential_connection = None;
        id
    }

    /// Set one node's display status
    pub fn set_node_status(&mut self, id: &str, status: NodeStatus) {
        if let Some(node) = self.state.nodes.iter_mut().find(|n| n.id == id) {
            node.set_status(status);
        }
    }

    /// Reset every node to `Initial`
    pub fn reset_statuses(&mut self) {
        for node in &mut self.state.nodes {
            node.set_status(NodeStatus::Initial);
        }
    }

    // ========== Edge Operations ==========

    /// Replace all edges
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        let count = edges.len();
        self.state.edges = edges;
        self.connection_sites = None;
        self.log_event(EventType::EdgesReplaced { count });
    }

    /// Append an edge unless the same connection already exists.
    /// Returns whether the edge was added.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if edge.source.is_empty() || edge.target.is_empty() {
            return false;
        }
        if self.state.edges.iter().any(|e| e.connects_same(&edge)) {
            return false;
        }

        debug!(id = %edge.id, "adding edge");
        self.log_event(EventType::EdgeAdded {
            id: edge.id.clone(),
        });

        self.state.edges.push(edge);
        self.connection_sites = None;
        true
    }

    /// Remove the edge with exactly this id. Returns whether one was removed.
    pub fn remove_edge(&mut self, id: &str) -> bool {
        let before = self.state.edges.len();
        self.state.edges.retain(|e| e.id != id);
        if self.state.edges.len() == before {
            return false;
        }

        self.connection_sites = None;
        self.log_event(EventType::EdgeRemoved { id: id.to_string() });
        true
    }

    /// The user dragged from one handle to another
    pub fn on_connect(&mut self, connection: Connection) -> bool {
        self.add_edge(connection.into())
    }

    // ========== Change Batches ==========

    /// Apply renderer deltas to the node list.
    ///
    /// In fixed layout mode a dimension change returns a layout request for
    /// the whole graph; the caller runs it and hands the result to
    /// [`GraphStore::apply_layout`].
    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) -> Option<LayoutRequest> {
        let applied = apply_node_changes(changes, &mut self.state.nodes);
        if !applied.is_empty() {
            self.revision += 1;
        }

        for event in applied {
            match event {
                EventType::NodeRemoved { id, .. } => {
                    let cascaded_edges = self.remove_incident_edges(&id);
                    self.dragged_nodes.remove(&id);
                    self.log_event(EventType::NodeRemoved { id, cascaded_edges });
                }
                event => self.log_event(event),
            }
        }
        self.connection_sites = None;

        if self.state.layout_mode == LayoutMode::Fixed && changes.iter().any(NodeChange::is_dimensions) {
            return Some(self.request_layout());
        }
        None
    }

    /// Apply renderer deltas to the edge list
    pub fn on_edges_change(&mut self, changes: &[EdgeChange]) {
        for event in apply_edge_changes(changes, &mut self.state.edges) {
            self.log_event(event);
        }
        self.connection_sites = None;
    }

    // ========== Layout ==========

    pub fn toggle_layout(&mut self) -> LayoutMode {
        let mode = self.state.layout_mode.toggled();
        self.state.layout_mode = mode;
        self.log_event(EventType::LayoutModeChanged { mode });
        mode
    }

    /// Issue a new layout request, superseding any outstanding one
    pub fn request_layout(&mut self) -> LayoutRequest {
        self.layout_seq += 1;

        LayoutRequest {
            ticket: LayoutTicket {
                seq: self.layout_seq,
                revision: self.revision,
            },
            nodes: self.state.nodes.clone(),
            edges: self.state.edges.clone(),
        }
    }

    /// Apply positions computed for `ticket`.
    ///
    /// Discarded if a newer request was issued or nodes were added, removed
    /// or replaced since the request. Returns whether it was applied.
    pub fn apply_layout(&mut self, ticket: LayoutTicket, laid_out: Vec<Node>) -> bool {
        if ticket.seq != self.layout_seq || ticket.revision != self.revision {
            debug!(seq = ticket.seq, latest = self.layout_seq, "discarding stale layout");
            self.log_event(EventType::LayoutDiscarded { seq: ticket.seq });
            return false;
        }

        let positions: HashMap<String, Position> = laid_out
            .into_iter()
            .map(|n| (n.id, n.position))
            .collect();

        for node in &mut self.state.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.set_position(*position);
            }
        }

        self.connection_sites = None;
        self.log_event(EventType::LayoutApplied { seq: ticket.seq });
        true
    }

    // ========== Potential Connections ==========

    /// Live connection sites, rebuilt if the graph changed
    pub fn connection_sites(&mut self) -> &ConnectionSiteIndex {
        let state = &self.state;
        self.connection_sites
            .get_or_insert_with(|| ConnectionSiteIndex::rebuild(&state.nodes, &state.edges))
    }

    /// Find the nearest eligible site to `position` and remember it
    pub fn check_for_potential_connection(
        &mut self,
        position: Position,
        query: &PotentialConnectionQuery,
    ) -> Option<&PotentialConnection> {
        let found = self.connection_sites().nearest(position, query).cloned();
        self.potential_connection = found;
        self.potential_connection.as_ref()
    }

    /// Query for a palette item of `node_type` being dragged at `position`.
    /// Types without handles leave the current state untouched.
    pub fn check_for_dragged_type(
        &mut self,
        node_type: NodeType,
        position: Position,
    ) -> Option<&PotentialConnection> {
        match node_type.config().capability().query_role() {
            Some(role) => {
                self.check_for_potential_connection(position, &PotentialConnectionQuery::with_role(role))
            }
            None => self.potential_connection.as_ref(),
        }
    }

    pub fn reset_potential_connection(&mut self) {
        self.potential_connection = None;
    }

    // ========== Drag Tracking ==========

    pub fn on_node_drag_start(&mut self, nodes: &[Node]) {
        self.dragged_nodes = nodes.iter().map(|n| (n.id.clone(), n.clone())).collect();
    }

    pub fn on_node_drag_stop(&mut self) {
        self.dragged_nodes.clear();
        self.potential_connection = None;
    }

    // ========== Event Logging ==========

    fn log_event(&mut self, event: EventType) {
        self.events.push(GraphEvent::new(event));
    }

    /// Get all events
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Internal ==========

    fn remove_incident_edges(&mut self, node_id: &str) -> Vec<String> {
        let (removed, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.state.edges)
            .into_iter()
            .partition(|e| e.involves(node_id));
        self.state.edges = kept;
        removed.into_iter().map(|e| e.id).collect()
    }

    fn structure_changed(&mut self) {
        self.revision += 1;
        self.connection_sites = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{edge_id, NodeData, SNAP_RADIUS};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn node(id: &str, node_type: NodeType, x: f64, y: f64) -> Node {
        Node::with_id(id, node_type, Position::new(x, y), NodeData::default())
    }

    /// initial(a) -> transform(b) -> output(c), stacked vertically
    fn chain() -> GraphStore {
        GraphStore::with_graph(
            vec![
                node("a", NodeType::Initial, 0.0, 0.0),
                node("b", NodeType::Transform, 0.0, 200.0),
                node("c", NodeType::Output, 0.0, 400.0),
            ],
            vec![Edge::between("a", "b"), Edge::between("b", "c")],
        )
    }

    #[test]
    fn test_store_creation() {
        let store = GraphStore::new();
        assert!(store.nodes().is_empty());
        assert!(store.edges().is_empty());
        assert_eq!(store.layout_mode(), LayoutMode::Free);
    }

    #[test]
    fn test_add_and_remove_node() {
        let mut store = GraphStore::new();
        store.add_node(node("a", NodeType::Initial, 0.0, 0.0));
        assert_eq!(store.nodes().len(), 1);

        store.remove_node("a");
        assert!(store.nodes().is_empty());

        // second removal is a no-op
        store.remove_node("a");
        assert!(store.nodes().is_empty());
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut store = chain();
        store.remove_node("b");

        assert_eq!(store.nodes().len(), 2);
        assert!(store.edges().is_empty());

        let last = store.events().last().unwrap();
        assert_matches!(&last.event, EventType::NodeRemoved { cascaded_edges, .. } if cascaded_edges.len() == 2);
    }

    #[test]
    fn test_add_node_by_type_centers_and_returns_id() {
        let mut store = GraphStore::new();
        let id = store.add_node_by_type(NodeType::Branch, Position::new(130.0, 25.0));

        let node = store.node(&id).unwrap();
        assert_eq!(node.position, Position::new(0.0, 0.0));
        assert_eq!(node.status(), NodeStatus::Initial);
        assert_eq!(node.title(), "Branch Node");
    }

    #[test]
    fn test_add_node_in_between_rewires_edge() {
        let mut store = chain();

        let new_id = store.add_node_in_between(InsertBetween {
            node_type: NodeType::Transform,
            source: Some("a".into()),
            target: Some("b".into()),
            source_handle: None,
            target_handle: None,
            position: Position::new(130.0, 125.0),
        });

        assert_eq!(store.nodes().len(), 4);
        assert_eq!(store.edges().len(), 3);
        assert!(store.edge(&edge_id("a", None, "b", None)).is_none());
        assert!(store.edge(&edge_id("a", None, &new_id, None)).is_some());
        assert!(store.edge(&edge_id(&new_id, None, "b", None)).is_some());
    }

    #[test]
    fn test_add_node_in_between_drops_links_without_handles() {
        // output has no source handle: only the upstream link survives
        let mut store = chain();
        let new_id = store.add_node_in_between(InsertBetween {
            node_type: NodeType::Output,
            source: Some("a".into()),
            target: Some("b".into()),
            source_handle: None,
            target_handle: None,
            position: Position::default(),
        });
        assert_eq!(store.edges().len(), 2);
        assert!(store.edge(&edge_id("a", None, &new_id, None)).is_some());

        // initial has no target handle: only the downstream link survives
        let mut store = chain();
        store.add_node_in_between(InsertBetween {
            node_type: NodeType::Initial,
            source: Some("b".into()),
            target: Some("c".into()),
            source_handle: None,
            target_handle: None,
            position: Position::default(),
        });
        assert_eq!(store.edges().len(), 2);
        assert!(store.outgoing_edges("b").is_empty());
    }

    #[test]
    fn test_add_node_in_between_uses_branch_handles() {
        let mut store = GraphStore::with_graph(
            vec![
                node("a", NodeType::Branch, 0.0, 0.0),
                node("b", NodeType::Output, 0.0, 200.0),
            ],
            vec![Edge::new("a", "b", Some("false".into()), None)],
        );

        let new_id = store.add_node_in_between(InsertBetween {
            node_type: NodeType::Branch,
            source: Some("a".into()),
            target: Some("b".into()),
            source_handle: Some("false".into()),
            target_handle: None,
            position: Position::default(),
        });

        assert!(store
            .edge(&edge_id("a", Some("false"), &new_id, None))
            .is_some());
        assert!(store
            .edge(&edge_id(&new_id, Some("true"), "b", None))
            .is_some());
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn test_add_edge_deduplicates() {
        let mut store = chain();
        assert!(!store.add_edge(Edge::between("a", "b")));
        assert!(!store.add_edge(Edge::between("", "b")));
        assert!(store.add_edge(Edge::between("a", "c")));
        assert_eq!(store.edges().len(), 3);
    }

    #[test]
    fn test_remove_edge_absent_is_noop() {
        let mut store = chain();
        assert!(!store.remove_edge("missing"));
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn test_connected_edge_is_removable_by_derived_id() {
        let mut store = chain();
        store.on_connect(Connection {
            source: "a".into(),
            target: "c".into(),
            source_handle: None,
            target_handle: None,
        });

        assert!(store.remove_edge(&edge_id("a", None, "c", None)));
    }

    #[test]
    fn test_on_nodes_change_cascades_removals() {
        let mut store = chain();
        let request = store.on_nodes_change(&[NodeChange::Remove { id: "c".into() }]);

        assert!(request.is_none());
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn test_change_batches_are_journaled() {
        let mut store = chain();
        store.clear_events();

        store.on_nodes_change(&[
            NodeChange::Add {
                item: node("d", NodeType::Output, 0.0, 600.0),
                index: None,
            },
            NodeChange::Replace {
                id: "b".into(),
                item: node("b", NodeType::Transform, 50.0, 200.0),
            },
            NodeChange::Remove { id: "c".into() },
            NodeChange::Remove { id: "ghost".into() },
        ]);
        store.on_edges_change(&[
            EdgeChange::Add {
                item: Edge::between("b", "d"),
                index: None,
            },
            EdgeChange::Remove {
                id: edge_id("a", None, "b", None),
            },
        ]);

        let events: Vec<EventType> = store.events().iter().map(|e| e.event.clone()).collect();
        assert_eq!(
            events,
            vec![
                EventType::NodeAdded {
                    id: "d".into(),
                    node_type: NodeType::Output,
                },
                EventType::NodeReplaced { id: "b".into() },
                EventType::NodeRemoved {
                    id: "c".into(),
                    cascaded_edges: vec![edge_id("b", None, "c", None)],
                },
                EventType::EdgeAdded {
                    id: edge_id("b", None, "d", None),
                },
                EventType::EdgeRemoved {
                    id: edge_id("a", None, "b", None),
                },
            ]
        );
    }

    #[test]
    fn test_dimension_change_requests_layout_only_when_fixed() {
        let dims = NodeChange::Dimensions {
            id: "a".into(),
            dimensions: Some(crate::Dimensions {
                width: 260.0,
                height: 60.0,
            }),
        };

        let mut store = chain();
        assert!(store.on_nodes_change(std::slice::from_ref(&dims)).is_none());

        store.toggle_layout();
        assert_eq!(store.layout_mode(), LayoutMode::Fixed);
        let request = store.on_nodes_change(&[dims]).unwrap();
        assert_eq!(request.nodes.len(), 3);
        assert_eq!(request.edges.len(), 2);
    }

    #[test]
    fn test_stale_layout_is_discarded() {
        let mut store = chain();
        let first = store.request_layout();
        let second = store.request_layout();

        let mut moved = second.nodes.clone();
        moved[0].position = Position::new(999.0, 999.0);

        assert!(!store.apply_layout(first.ticket, moved.clone()));
        assert_eq!(store.node("a").unwrap().position, Position::new(0.0, 0.0));

        assert!(store.apply_layout(second.ticket, moved));
        assert_eq!(store.node("a").unwrap().position, Position::new(999.0, 999.0));
    }

    #[test]
    fn test_layout_discarded_after_structural_edit() {
        let mut store = chain();
        let request = store.request_layout();
        store.add_node(node("d", NodeType::Output, 0.0, 0.0));

        assert!(!store.apply_layout(request.ticket, request.nodes));
        assert_matches!(
            store.events().last().unwrap().event,
            EventType::LayoutDiscarded { .. }
        );
    }

    #[test]
    fn test_potential_connection_to_edge_midpoint() {
        let mut store = chain();

        // midpoint of a->b is (130, 125)
        let found = store
            .check_for_potential_connection(
                Position::new(140.0, 125.0),
                &PotentialConnectionQuery::default(),
            )
            .cloned()
            .unwrap();
        assert_eq!(found.id, edge_id("a", None, "b", None));

        store.drop_node(NodeType::Transform, Position::new(0.0, 0.0));
        assert_eq!(store.nodes().len(), 4);
        assert_eq!(store.edges().len(), 3);
        assert!(store.potential_connection().is_none());
    }

    #[test]
    fn test_potential_connection_cleared_when_out_of_range() {
        let mut store = chain();
        store.check_for_potential_connection(Position::new(130.0, 125.0), &PotentialConnectionQuery::default());
        assert!(store.potential_connection().is_some());

        let far = Position::new(130.0 + SNAP_RADIUS * 10.0, 0.0);
        store.check_for_potential_connection(far, &PotentialConnectionQuery::default());
        assert!(store.potential_connection().is_none());
    }

    #[test]
    fn test_dragged_type_filters_same_role() {
        let mut store = GraphStore::with_graph(vec![node("a", NodeType::Initial, 0.0, 0.0)], vec![]);

        // an initial node exposes only a source handle, so the lone source site is skipped
        assert!(store
            .check_for_dragged_type(NodeType::Initial, Position::new(130.0, 50.0))
            .is_none());

        let found = store
            .check_for_dragged_type(NodeType::Output, Position::new(130.0, 60.0))
            .unwrap();
        assert_eq!(found.role, Some(HandleRole::Source));
    }

    #[test]
    fn test_drag_stop_clears_state() {
        let mut store = chain();
        let dragged: Vec<Node> = store.nodes()[..2].to_vec();
        store.on_node_drag_start(&dragged);
        assert_eq!(store.dragged_nodes().len(), 2);

        store.check_for_potential_connection(Position::new(130.0, 125.0), &PotentialConnectionQuery::default());
        store.on_node_drag_stop();

        assert!(store.dragged_nodes().is_empty());
        assert!(store.potential_connection().is_none());
    }

    #[test]
    fn test_statuses() {
        let mut store = chain();
        store.set_node_status("b", NodeStatus::Success);
        store.set_node_status("missing", NodeStatus::Error);
        assert_eq!(store.node("b").unwrap().status(), NodeStatus::Success);

        store.reset_statuses();
        assert!(store.nodes().iter().all(|n| n.status() == NodeStatus::Initial));
    }

    #[test]
    fn test_start_node() {
        let store = chain();
        assert_eq!(store.start_node().unwrap().id, "a");

        let cyclic = GraphStore::with_graph(
            vec![node("x", NodeType::Transform, 0.0, 0.0), node("y", NodeType::Transform, 0.0, 0.0)],
            vec![Edge::between("x", "y"), Edge::between("y", "x")],
        );
        assert!(cyclic.start_node().is_none());
    }
}
