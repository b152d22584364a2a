use crate::{Edge, GraphStore, Node};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use ulid::Ulid;

/// A named, persisted graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlowRecord {
    /// Create a record with a fresh id and timestamps
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            description,
            nodes,
            edges,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; only the fields present are replaced
    pub fn apply(&mut self, update: FlowUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(nodes) = update.nodes {
            self.nodes = nodes;
        }
        if let Some(edges) = update.edges {
            self.edges = edges;
        }
        self.touch();
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }
}

/// Body of `POST /flows`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewFlow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Edge>>,
}

impl NewFlow {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_graph(mut self, snapshot: FlowSnapshot) -> Self {
        self.nodes = Some(snapshot.nodes);
        self.edges = Some(snapshot.edges);
        self
    }
}

/// Body of `PUT /flows/{id}`; any subset of fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absent leaves the description alone; `null` clears it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Edge>>,
}

/// `{flow}` response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEnvelope {
    pub flow: FlowRecord,
}

/// `{flows}` response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowList {
    pub flows: Vec<FlowRecord>,
}

/// `{success}` response to a delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
}

/// Nodes and edges only. A FlowRecord file also parses as a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlowSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowSnapshot {
    pub fn from_store(store: &GraphStore) -> Self {
        Self {
            nodes: store.nodes().to_vec(),
            edges: store.edges().to_vec(),
        }
    }

    pub fn into_store(self) -> GraphStore {
        GraphStore::with_graph(self.nodes, self.edges)
    }

    /// Save snapshot to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create flow file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write flow to: {}", path.display()))?;
        Ok(())
    }

    /// Load snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open flow file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse flow from: {}", path.display()))
    }
}
