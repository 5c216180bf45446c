//! Authentication extractors for Axum.

use crate::error::ErrorBody;
use crate::state::AppState;
use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use nexus_platform_access::{AuthenticationError, UserProfile};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Returns the bearer credential of a request, if any.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for requiring a signed-in user.
///
/// The bearer token is an identity provider ID token, resolved on every
/// request.
pub struct RequireAuth(pub UserProfile);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or(AuthRejection::NotAuthenticated)?;

        let profile = app_state.identity.lookup(token).await.map_err(|e| match e {
            AuthenticationError::Rejected { .. } | AuthenticationError::InvalidToken { .. } => {
                tracing::debug!(error = %e, "bearer token refused");
                AuthRejection::SessionExpired
            }
            other => {
                tracing::error!(error = %other, "identity lookup failed");
                AuthRejection::ProviderUnavailable
            }
        })?;

        Ok(RequireAuth(profile))
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    SessionExpired,
    ProviderUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Sign in required"),
            Self::SessionExpired => (StatusCode::UNAUTHORIZED, "Session expired. Sign in again."),
            Self::ProviderUnavailable => (
                StatusCode::BAD_GATEWAY,
                "Identity provider unavailable",
            ),
        };

        (status, Json(ErrorBody::new(status, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nx_abc_123"));
        assert_eq!(bearer_token(&headers), Some("nx_abc_123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
