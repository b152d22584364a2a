//! Async front of the graph store: layout round trips and flow loading.

use crate::flow::{FlowRecord, FlowSnapshot};
use crate::layout::GraphLayout;
use crate::server::repository::{FlowRepository, FlowStore};
use crate::store::LayoutRequest;
use crate::{NodeChange, SharedStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::extract::Query;
use axum::http::Uri;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Anything a flow can be fetched from by id
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn fetch_flow(&self, id: &str) -> Result<FlowRecord>;
}

#[async_trait]
impl FlowSource for FlowStore {
    async fn fetch_flow(&self, id: &str) -> Result<FlowRecord> {
        Ok(self.get(id).await?)
    }
}

#[derive(Debug, Deserialize)]
struct OpenParams {
    flow: Option<String>,
}

/// Owns a shared store and the layout adapter used for it
pub struct Editor {
    store: SharedStore,
    layout: Arc<dyn GraphLayout>,
}

impl Editor {
    pub fn new(store: SharedStore, layout: Arc<dyn GraphLayout>) -> Self {
        Self { store, layout }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Current nodes and edges
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot::from_store(&self.store.lock())
    }

    /// Apply renderer deltas, re-laying out the graph when the store asks.
    /// Returns whether a layout was applied.
    pub async fn on_nodes_change(&self, changes: &[NodeChange]) -> Result<bool> {
        let request = self.store.lock().on_nodes_change(changes);

        match request {
            Some(request) => self.run_layout(request).await,
            None => Ok(false),
        }
    }

    /// Lay out the whole graph now. Returns false if the result went stale.
    pub async fn auto_layout(&self) -> Result<bool> {
        let request = self.store.lock().request_layout();
        self.run_layout(request).await
    }

    async fn run_layout(&self, request: LayoutRequest) -> Result<bool> {
        let LayoutRequest {
            ticket,
            nodes,
            edges,
        } = request;
        debug!(seq = ticket.seq, nodes = nodes.len(), "running layout");

        let laid_out = self
            .layout
            .layout(nodes, &edges)
            .await
            .context("Layout failed")?;

        Ok(self.store.lock().apply_layout(ticket, laid_out))
    }

    /// Replace the graph with a stored flow
    pub async fn load_flow(&self, id: &str, source: &dyn FlowSource) -> Result<FlowRecord> {
        let flow = source
            .fetch_flow(id)
            .await
            .with_context(|| format!("Failed to load flow {id}"))?;

        {
            let mut store = self.store.lock();
            store.set_nodes(flow.nodes.clone());
            store.set_edges(flow.edges.clone());
        }

        info!(id = %flow.id, name = %flow.name, "loaded flow");
        Ok(flow)
    }

    /// Load the flow named by a `flow=<id>` query parameter, if any
    pub async fn open_from_uri(&self, uri: &Uri, source: &dyn FlowSource) -> Result<Option<FlowRecord>> {
        let Query(params) = Query::<OpenParams>::try_from_uri(uri)
            .with_context(|| format!("Invalid query string in {uri}"))?;

        match params.flow.filter(|id| !id.is_empty()) {
            Some(id) => self.load_flow(&id, source).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::NewFlow;
    use crate::layout::LayeredLayout;
    use crate::{Dimensions, Edge, GraphStore, Node, NodeData, NodeType, Position};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// First call is slow, later calls are fast
    struct SlowFirstLayout {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GraphLayout for SlowFirstLayout {
        async fn layout(&self, nodes: Vec<Node>, edges: &[Edge]) -> Result<Vec<Node>> {
            let delay = match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => 100,
                _ => 10,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(LayeredLayout::default().arrange(nodes, edges))
        }
    }

    fn chain() -> SharedStore {
        GraphStore::with_graph(
            vec![
                Node::with_id("a", NodeType::Initial, Position::new(500.0, 500.0), NodeData::default()),
                Node::with_id("b", NodeType::Output, Position::new(-500.0, 900.0), NodeData::default()),
            ],
            vec![Edge::between("a", "b")],
        )
        .shared()
    }

    fn editor(store: SharedStore) -> Editor {
        Editor::new(store, Arc::new(LayeredLayout::default()))
    }

    #[tokio::test]
    async fn test_auto_layout_positions_nodes() {
        let editor = editor(chain());
        assert!(editor.auto_layout().await.unwrap());

        let store = editor.store().lock();
        assert_eq!(store.node("a").unwrap().position, Position::new(-130.0, 0.0));
        assert_eq!(store.node("b").unwrap().position, Position::new(-130.0, 130.0));
    }

    #[tokio::test]
    async fn test_dimension_change_relayouts_in_fixed_mode() {
        let store = chain();
        store.lock().toggle_layout();
        let editor = editor(store);

        let applied = editor
            .on_nodes_change(&[NodeChange::Dimensions {
                id: "a".into(),
                dimensions: Some(Dimensions {
                    width: 260.0,
                    height: 80.0,
                }),
            }])
            .await
            .unwrap();

        assert!(applied);
        assert_eq!(editor.snapshot().nodes[0].position, Position::new(-130.0, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_layout_result_is_discarded() {
        let editor = Editor::new(
            chain(),
            Arc::new(SlowFirstLayout {
                calls: AtomicUsize::new(0),
            }),
        );

        let (first, second) = tokio::join!(editor.auto_layout(), editor.auto_layout());

        assert!(!first.unwrap());
        assert!(second.unwrap());
    }

    #[tokio::test]
    async fn test_open_from_uri_loads_flow() {
        let repo = FlowStore::in_memory();
        let snapshot = FlowSnapshot::from_store(&chain().lock());
        let flow = repo
            .create(NewFlow::named("Demo").with_graph(snapshot))
            .await
            .unwrap();

        let editor = editor(GraphStore::new().shared());
        let uri: Uri = format!("/workflow?flow={}", flow.id).parse().unwrap();

        let loaded = editor.open_from_uri(&uri, &repo).await.unwrap().unwrap();
        assert_eq!(loaded.id, flow.id);
        assert_eq!(editor.snapshot(), flow.snapshot());
    }

    #[tokio::test]
    async fn test_open_from_uri_without_flow_param() {
        let repo = FlowStore::in_memory();
        let editor = editor(chain());

        let uri: Uri = "/workflow?other=1".parse().unwrap();
        assert!(editor.open_from_uri(&uri, &repo).await.unwrap().is_none());
        assert_eq!(editor.snapshot().nodes.len(), 2);

        let missing: Uri = "/workflow?flow=nope".parse().unwrap();
        assert!(editor.open_from_uri(&missing, &repo).await.is_err());
    }
}
