//! Sync trigger handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use graphsync_core::{StreamKind, SyncError};
use serde::Serialize;
use tracing::{error, info};

use crate::state::AppState;

/// Body returned by every trigger.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TriggerResponse {
    fn accepted(message: Option<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::ACCEPTED,
            Json(Self {
                status: "Accepted",
                message,
            }),
        )
    }
}

/// Queue one pass of the named stream.
pub async fn trigger_stream(
    State(state): State<AppState>,
    Path(stream): Path<String>,
) -> (StatusCode, Json<TriggerResponse>) {
    let stream = match stream.parse::<StreamKind>() {
        Ok(s) if state.orchestrator.worker(s).is_some() => s,
        Ok(s) => return not_found(SyncError::UnknownStream(s.to_string())),
        Err(e) => return not_found(e),
    };

    match state.orchestrator.sync_one(stream).await {
        Ok(job_id) => info!(%stream, %job_id, "Sync triggered"),
        Err(e) => error!(%stream, error = %e, "Failed to queue sync"),
    }
    TriggerResponse::accepted(Some(format!("{} sync queued", stream)))
}

/// Queue one pass of every stream.
pub async fn trigger_all(State(state): State<AppState>) -> (StatusCode, Json<TriggerResponse>) {
    match state.orchestrator.sync_all().await {
        Ok(jobs) => info!(jobs = jobs.len(), "Full sync triggered"),
        Err(e) => error!(error = %e, "Failed to queue full sync"),
    }
    TriggerResponse::accepted(None)
}

/// Watermark and connection state per stream.
pub async fn status(
    State(state): State<AppState>,
) -> Json<Vec<graphsync_core::sync::StreamStatus>> {
    Json(state.orchestrator.status().await)
}

fn not_found(err: SyncError) -> (StatusCode, Json<TriggerResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(TriggerResponse {
            status: "NotFound",
            message: Some(err.to_string()),
        }),
    )
}
