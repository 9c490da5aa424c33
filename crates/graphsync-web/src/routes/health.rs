//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// Always up while the process serves requests; touches no store.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "up" }))
}
