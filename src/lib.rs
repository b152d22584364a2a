// Flow Graph Editor - Core Library

pub mod changes;
pub mod client;
pub mod connection;
pub mod edge;
pub mod editor;
pub mod event;
pub mod flow;
pub mod layout;
pub mod node;
pub mod node_config;
pub mod runner;
pub mod server;
pub mod store;
pub mod validation;

// Re-export main types for convenience
pub use changes::{apply_edge_changes, apply_node_changes, EdgeChange, NodeChange};
pub use client::HttpFlowClient;
pub use connection::{
    ConnectionHandle, ConnectionSite, ConnectionSiteIndex, PotentialConnection,
    PotentialConnectionQuery, SNAP_RADIUS,
};
pub use edge::{edge_id, Connection, Edge, WORKFLOW_EDGE};
pub use editor::{Editor, FlowSource};
pub use event::{EventType, GraphEvent};
pub use flow::{FlowRecord, FlowSnapshot, FlowUpdate, NewFlow};
pub use layout::{GraphLayout, LayeredLayout};
pub use node::{Dimensions, Node, NodeData, NodeStatus, NodeType, Position, SeparatorKind};
pub use node_config::{Handle, HandleCapability, HandleRole, HandleSide, Icon, NodeConfig, NODE_SIZE};
pub use runner::{GraphRunner, RunOutcome, RunReport, RunState, RunToken, RunnerConfig};
pub use store::{GraphState, GraphStore, InsertBetween, LayoutMode, LayoutRequest, LayoutTicket, SharedStore};
pub use validation::{
    ValidatedStore, ValidationIssue, ValidationIssueType, ValidationResult, ValidationSeverity, Validator,
};
