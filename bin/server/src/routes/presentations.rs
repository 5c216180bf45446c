//! Saved presentation handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::Value;
use std::sync::Arc;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::types::PresentationSummary;

/// Lists the caller's decks, newest first where possible.
pub async fn list_presentations(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<PresentationSummary>>, ApiError> {
    let records = state.records.user_presentations(&user.id).await?;
    Ok(Json(
        records.into_iter().map(PresentationSummary::from).collect(),
    ))
}

/// Saves a deck.
pub async fn save_presentation(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    ApiJson(data): ApiJson<Value>,
) -> Result<(StatusCode, Json<PresentationSummary>), ApiError> {
    if !(data.is_object() || data.is_array()) {
        return Err(ApiError::bad_request("Presentation must be a JSON object"));
    }

    let record = state.records.save_presentation(&user.id, data).await?;
    Ok((StatusCode::CREATED, Json(PresentationSummary::from(record))))
}
