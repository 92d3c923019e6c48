//! Backup API endpoints

use api_types::backup::BackupSnapshot;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;

use crate::{ServerError, server::ServerState};

/// Handle requests for a full snapshot of the store
pub async fn export(State(state): State<ServerState>) -> Result<Json<BackupSnapshot>, ServerError> {
    Ok(Json(state.engine.export().await?))
}

/// Handle requests replacing the whole store with the uploaded snapshot
pub async fn import(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ServerError> {
    let snapshot = engine::decode_snapshot(body)?;
    state.engine.import(snapshot).await?;
    Ok(StatusCode::NO_CONTENT)
}
