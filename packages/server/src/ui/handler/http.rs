//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{domain::CountEntry, ui::state::AppState};

/// Plain-text greeting at the root path
pub async fn hello() -> &'static str {
    "Hello, World!"
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current counters, ordered by target id
pub async fn get_counts(State(state): State<Arc<AppState>>) -> Json<Vec<CountEntry>> {
    let snapshot = state.counter.lock().await.snapshot();
    Json(snapshot)
}
