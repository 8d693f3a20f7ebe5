//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::ui::state::AppState;

/// Health check endpoint with process uptime and current connection count.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let connections = state.registry.connection_count().await;
    Json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "connections": connections,
    }))
}
