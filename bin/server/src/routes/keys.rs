//! API key management handlers.

use axum::{Json, extract::State, http::StatusCode};
use nexus_records::ApiKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateKey {
    name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedKey {
    key: String,
}

/// Lists the caller's active keys.
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ApiKey>>, ApiError> {
    Ok(Json(state.records.user_keys(&user.id).await?))
}

/// Issues a key with a non-blank name.
pub async fn create_key(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CreateKey>,
) -> Result<(StatusCode, Json<CreatedKey>), ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Key name must not be empty"));
    }

    let key = state.records.generate_api_key(&user.id, name).await?;
    info!(user_id = %user.id, "issued api key");
    Ok((StatusCode::CREATED, Json(CreatedKey { key })))
}
