//! HTTP handlers, grouped by resource.

pub mod chat;
pub mod keys;
pub mod presentations;
pub mod sandbox;

use axum::Json;
use serde_json::{Value, json};

/// Liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
