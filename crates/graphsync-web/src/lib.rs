//! graphsync HTTP trigger surface
//!
//! Axum routes that queue sync passes and return immediately. Sync failures
//! never reach the caller; they are only visible in the logs.

pub mod routes;
pub mod state;

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use graphsync_core::Orchestrator;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/sync/all", post(routes::sync::trigger_all))
        .route("/sync/{stream}", post(routes::sync::trigger_stream))
        .route("/status", get(routes::sync::status))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run_server(
    orchestrator: Arc<Orchestrator>,
    host: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = AppState::new(orchestrator);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Sync trigger listening on http://{}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
