//! Authentication routes for registration, sign-in and profile lookup.

use axum::{Json, extract::State, http::StatusCode};
use nexus_platform_access::{AuthSession, UserProfile};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::RequireAuth;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Email and password credentials.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::bad_request("Email and password are required"));
        }
        Ok(())
    }
}

/// ID token from a federated provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedSignIn {
    /// Provider identifier, e.g. `google.com`.
    #[serde(default = "default_provider_id")]
    provider_id: String,
    id_token: String,
}

fn default_provider_id() -> String {
    "google.com".to_string()
}

/// Creates an account and signs it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    credentials.validate()?;
    let session = state
        .identity
        .register(credentials.email.trim(), &credentials.password)
        .await?;
    info!(user_id = %session.profile.id, "registered user");
    Ok((StatusCode::CREATED, Json(session)))
}

/// Signs in with email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<AuthSession>, ApiError> {
    credentials.validate()?;
    let session = state
        .identity
        .sign_in(credentials.email.trim(), &credentials.password)
        .await?;
    Ok(Json(session))
}

/// Signs in with a federated provider's ID token.
pub async fn federated(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<FederatedSignIn>,
) -> Result<Json<AuthSession>, ApiError> {
    if request.id_token.trim().is_empty() {
        return Err(ApiError::bad_request("idToken is required"));
    }
    let session = state
        .identity
        .sign_in_federated(&request.provider_id, &request.id_token)
        .await?;
    Ok(Json(session))
}

/// Returns the signed-in user's profile.
pub async fn me(RequireAuth(profile): RequireAuth) -> Json<UserProfile> {
    Json(profile)
}
