//! Sync API endpoints

use api_types::sync::{PullQuery, SyncPullResponse, SyncPushResult, SyncStatus};
use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::Value;

use crate::{ServerError, server::ServerState};

/// Handle requests for the rows changed since the given cursor
pub async fn pull(
    State(state): State<ServerState>,
    Query(query): Query<PullQuery>,
) -> Result<Json<SyncPullResponse>, ServerError> {
    let response = state.engine.pull(query.cursor.as_deref()).await?;
    Ok(Json(response))
}

/// Handle requests applying a batch of dirty rows.
///
/// The body is decoded by the engine rather than by the `Json` extractor, so
/// a malformed record is reported with its list and index.
pub async fn push(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Result<Json<SyncPushResult>, ServerError> {
    let payload = engine::decode_push(body)?;
    let result = state.engine.push(payload).await?;
    Ok(Json(result))
}

pub async fn status(State(state): State<ServerState>) -> Result<Json<SyncStatus>, ServerError> {
    Ok(Json(SyncStatus {
        last_successful_sync_at: state.engine.last_successful_sync_at().await?,
    }))
}
