//! Connection sites for snapping a dragged palette item onto the graph.
//!
//! Sites are rebuilt from node positions and edges whenever the graph changes;
//! a query is a single linear scan.

use crate::{Edge, HandleRole, Node, Position};
use serde::{Deserialize, Serialize};

/// Maximum distance, in canvas units, at which a site is offered
pub const SNAP_RADIUS: f64 = 150.0;

/// One end of a potential connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub node: String,
    #[serde(default)]
    pub handle: Option<String>,
}

/// A place a new node could be attached to.
///
/// A free handle has a role and one endpoint; an edge midpoint has no role
/// and both endpoints, so dropping there splits the edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionSite {
    pub id: String,
    pub position: Position,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<HandleRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ConnectionHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ConnectionHandle>,
}

/// Best site found for the current drag position
pub type PotentialConnection = ConnectionSite;

/// Filters for a potential-connection query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PotentialConnectionQuery {
    /// Site ids to skip
    pub exclude: Vec<String>,
    /// Skip sites with this role (a source-only item never snaps to a source)
    pub role: Option<HandleRole>,
}

impl PotentialConnectionQuery {
    pub fn with_role(role: Option<HandleRole>) -> Self {
        Self {
            exclude: Vec::new(),
            role,
        }
    }
}

/// Live connection sites in graph order
#[derive(Debug, Clone, Default)]
pub struct ConnectionSiteIndex {
    sites: Vec<ConnectionSite>,
}

impl ConnectionSiteIndex {
    /// Derive all sites from the current graph: handles first, then edges
    pub fn rebuild(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut sites = Vec::new();

        for node in nodes {
            for handle in node.node_type.handles() {
                let endpoint = Some(ConnectionHandle {
                    node: node.id.clone(),
                    handle: handle.id.map(str::to_string),
                });
                let (source, target) = match handle.role {
                    HandleRole::Source => (endpoint, None),
                    HandleRole::Target => (None, endpoint),
                };

                sites.push(ConnectionSite {
                    id: format!(
                        "{}:{}:{}",
                        node.id,
                        handle.id.unwrap_or(handle.role.as_str()),
                        handle.role.as_str()
                    ),
                    position: node.position.offset(handle.offset),
                    role: Some(handle.role),
                    source,
                    target,
                });
            }
        }

        for edge in edges {
            let from = handle_position(nodes, &edge.source, HandleRole::Source, edge.source_handle.as_deref());
            let to = handle_position(nodes, &edge.target, HandleRole::Target, edge.target_handle.as_deref());

            if let (Some(from), Some(to)) = (from, to) {
                sites.push(ConnectionSite {
                    id: edge.id.clone(),
                    position: from.midpoint(&to),
                    role: None,
                    source: Some(ConnectionHandle {
                        node: edge.source.clone(),
                        handle: edge.source_handle.clone(),
                    }),
                    target: Some(ConnectionHandle {
                        node: edge.target.clone(),
                        handle: edge.target_handle.clone(),
                    }),
                });
            }
        }

        Self { sites }
    }

    pub fn sites(&self) -> &[ConnectionSite] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Nearest matching site strictly closer than [`SNAP_RADIUS`].
    /// Ties keep the first site seen.
    pub fn nearest(
        &self,
        position: Position,
        query: &PotentialConnectionQuery,
    ) -> Option<&ConnectionSite> {
        nearest_within(&self.sites, position, query, SNAP_RADIUS)
    }
}

/// Linear nearest-site scan over arbitrary sites
pub fn nearest_within<'a>(
    sites: &'a [ConnectionSite],
    position: Position,
    query: &PotentialConnectionQuery,
    radius: f64,
) -> Option<&'a ConnectionSite> {
    let mut closest: Option<(f64, &ConnectionSite)> = None;

    for site in sites {
        if query.exclude.iter().any(|id| id == &site.id) {
            continue;
        }
        if query.role.is_some() && query.role == site.role {
            continue;
        }

        let distance = site.position.distance_to(&position);
        match closest {
            Some((best, _)) if distance >= best => {}
            _ => closest = Some((distance, site)),
        }
    }

    closest
        .filter(|(distance, _)| *distance < radius)
        .map(|(_, site)| site)
}

/// Absolute position of a node's handle, matching by id when given
fn handle_position(
    nodes: &[Node],
    node_id: &str,
    role: HandleRole,
    handle_id: Option<&str>,
) -> Option<Position> {
    let node = nodes.iter().find(|n| n.id == node_id)?;
    let handles = node.node_type.handles();

    let handle = handles
        .iter()
        .find(|h| h.role == role && h.id == handle_id)
        .or_else(|| handles.iter().find(|h| h.role == role))?;

    Some(node.position.offset(handle.offset))
}
