//! Flow persistence behind the HTTP service.

use super::error::FlowError;
use crate::flow::{FlowList, FlowRecord, FlowUpdate, NewFlow};
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[async_trait]
pub trait FlowRepository: Send + Sync {
    /// All flows, newest `createdAt` first
    async fn list(&self) -> Result<Vec<FlowRecord>, FlowError>;

    async fn get(&self, id: &str) -> Result<FlowRecord, FlowError>;

    async fn create(&self, flow: NewFlow) -> Result<FlowRecord, FlowError>;

    async fn update(&self, id: &str, update: FlowUpdate) -> Result<FlowRecord, FlowError>;

    async fn delete(&self, id: &str) -> Result<(), FlowError>;
}

/// Flows held in memory, optionally mirrored to a JSON file.
///
/// Every mutation is staged on a copy and only committed once the file
/// write succeeds. Writers are serialized; readers see the last commit.
#[derive(Debug, Default)]
pub struct FlowStore {
    flows: RwLock<Vec<FlowRecord>>,
    path: Option<PathBuf>,
    writer: Mutex<()>,
}

impl FlowStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let flows = if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open flow store: {}", path.display()))?;
            let list: FlowList = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse flow store: {}", path.display()))?;
            list.flows
        } else {
            Vec::new()
        };

        info!(path = %path.display(), flows = flows.len(), "opened flow store");

        Ok(Self {
            flows: RwLock::new(flows),
            path: Some(path),
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the staged list on the blocking pool
    async fn persist(&self, flows: &[FlowRecord]) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let list = FlowList {
            flows: flows.to_vec(),
        };

        tokio::task::spawn_blocking(move || write_flows(&path, &list))
            .await
            .context("Flow store writer task failed")?
    }

    /// Stage a change on a copy, persist, then commit
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut Vec<FlowRecord>) -> Result<T, FlowError>,
    ) -> Result<T, FlowError> {
        let _writer = self.writer.lock().await;
        let mut staged = self.flows.read().clone();

        let value = change(&mut staged)?;
        self.persist(&staged).await?;

        *self.flows.write() = staged;
        Ok(value)
    }
}

fn write_flows(path: &Path, list: &FlowList) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create flow store: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, list)
        .with_context(|| format!("Failed to write flow store: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush flow store: {}", path.display()))?;

    Ok(())
}

fn name_taken(flows: &[FlowRecord], name: &str, except: Option<&str>) -> bool {
    flows
        .iter()
        .any(|f| f.name == name && Some(f.id.as_str()) != except)
}

#[async_trait]
impl FlowRepository for FlowStore {
    async fn list(&self) -> Result<Vec<FlowRecord>, FlowError> {
        let mut flows: Vec<FlowRecord> = self.flows.read().iter().rev().cloned().collect();
        flows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(flows)
    }

    async fn get(&self, id: &str) -> Result<FlowRecord, FlowError> {
        self.flows
            .read()
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(FlowError::NotFound)
    }

    async fn create(&self, flow: NewFlow) -> Result<FlowRecord, FlowError> {
        let name = flow
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(FlowError::MissingField("Name"))?;

        let record = FlowRecord::new(
            name,
            flow.description,
            flow.nodes.unwrap_or_default(),
            flow.edges.unwrap_or_default(),
        );

        self.commit(|flows| {
            if name_taken(flows, &record.name, None) {
                return Err(FlowError::DuplicateName);
            }
            flows.push(record.clone());
            Ok(())
        })
        .await?;

        debug!(id = %record.id, name = %record.name, "created flow");
        Ok(record)
    }

    async fn update(&self, id: &str, update: FlowUpdate) -> Result<FlowRecord, FlowError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(FlowError::MissingField("Name"));
        }

        let record = self.commit(|flows| {
            if let Some(name) = &update.name {
                if name_taken(flows, name, Some(id)) {
                    return Err(FlowError::DuplicateName);
                }
            }

            let record = flows
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or(FlowError::NotFound)?;
            record.apply(update);
            Ok(record.clone())
        })
        .await?;

        debug!(id, "updated flow");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), FlowError> {
        self.commit(|flows| {
            let before = flows.len();
            flows.retain(|f| f.id != id);
            if flows.len() == before {
                return Err(FlowError::NotFound);
            }
            Ok(())
        })
        .await?;

        debug!(id, "deleted flow");
        Ok(())
    }
}
