//! HTTP persistence service for named flows.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod handlers;
pub mod repository;

pub use config::ServerConfig;
pub use error::FlowError;
pub use repository::{FlowRepository, FlowStore};

pub fn create_router(repo: Arc<dyn FlowRepository>) -> Router {
    Router::new()
        .route("/flows", get(handlers::list_flows).post(handlers::create_flow))
        .route(
            "/flows/{id}",
            get(handlers::get_flow)
                .put(handlers::update_flow)
                .delete(handlers::delete_flow),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(repo)
}

/// Repository selected by the configuration
pub fn open_repository(config: &ServerConfig) -> Result<Arc<dyn FlowRepository>> {
    let store = match &config.store_path {
        Some(path) => FlowStore::open(path)?,
        None => FlowStore::in_memory(),
    };
    Ok(Arc::new(store))
}

/// Serve on an already bound listener until the task is dropped
pub async fn serve_on(listener: TcpListener, repo: Arc<dyn FlowRepository>) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Flow service listening on {}", addr);

    axum::serve(listener, create_router(repo))
        .await
        .context("Flow service terminated")
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let repo = open_repository(&config)?;

    let listener = TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.addr()))?;

    serve_on(listener, repo).await
}
