use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use super::error::FlowError;
use super::repository::FlowRepository;
use crate::flow::{Deleted, FlowEnvelope, FlowList, FlowUpdate, NewFlow};

pub type AppState = Arc<dyn FlowRepository>;

// ---------------------------------------------------------------------------
// GET /flows
// ---------------------------------------------------------------------------

/// Lists all flows, newest first.
pub async fn list_flows(State(repo): State<AppState>) -> Result<Json<FlowList>, FlowError> {
    let flows = repo.list().await?;
    Ok(Json(FlowList { flows }))
}

// ---------------------------------------------------------------------------
// POST /flows
// ---------------------------------------------------------------------------

/// Creates a flow. A `null` body is treated as an empty object.
pub async fn create_flow(
    State(repo): State<AppState>,
    body: Result<Json<Option<NewFlow>>, JsonRejection>,
) -> Result<Json<FlowEnvelope>, FlowError> {
    let Json(body) = body?;

    let flow = repo.create(body.unwrap_or_default()).await?;
    info!(id = %flow.id, name = %flow.name, "flow created");

    Ok(Json(FlowEnvelope { flow }))
}

// ---------------------------------------------------------------------------
// GET /flows/{id}
// ---------------------------------------------------------------------------

pub async fn get_flow(
    State(repo): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlowEnvelope>, FlowError> {
    let flow = repo.get(&id).await?;
    Ok(Json(FlowEnvelope { flow }))
}

// ---------------------------------------------------------------------------
// PUT /flows/{id}
// ---------------------------------------------------------------------------

/// Replaces whichever fields are present and bumps `updatedAt`.
pub async fn update_flow(
    State(repo): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Option<FlowUpdate>>, JsonRejection>,
) -> Result<Json<FlowEnvelope>, FlowError> {
    let Json(body) = body?;

    let flow = repo.update(&id, body.unwrap_or_default()).await?;
    Ok(Json(FlowEnvelope { flow }))
}

// ---------------------------------------------------------------------------
// DELETE /flows/{id}
// ---------------------------------------------------------------------------

pub async fn delete_flow(
    State(repo): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, FlowError> {
    repo.delete(&id).await?;
    info!(%id, "flow deleted");

    Ok(Json(Deleted { success: true }))
}
