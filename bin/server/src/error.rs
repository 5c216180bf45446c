//! Error responses for the HTTP API.
//!
//! Domain errors are mapped onto [`ApiError`], which logs the details and
//! answers with a user-safe `{"error": ..., "message": ...}` body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nexus_conversation::SessionError;
use nexus_platform_access::AuthenticationError;
use nexus_records::StoreError;
use serde::Serialize;
use std::fmt;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: status.canonical_reason().unwrap_or("Error"),
            message: message.into(),
        }
    }
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credentials.
    Unauthorized { message: String },
    /// The request was malformed.
    BadRequest { message: String },
    /// The JSON body could not be read; keeps the extractor's status.
    InvalidBody { status: StatusCode, message: String },
    /// The resource does not exist or belongs to someone else.
    NotFound { what: &'static str },
    /// The request was superseded before it finished.
    Cancelled,
    /// An upstream service failed.
    Upstream { service: &'static str, details: String },
    /// Anything else.
    Internal { details: String },
}

impl ApiError {
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidBody { status, .. } => *status,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Cancelled => StatusCode::CONFLICT,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { message } => write!(f, "unauthorized: {message}"),
            Self::BadRequest { message } => write!(f, "bad request: {message}"),
            Self::InvalidBody { message, .. } => write!(f, "invalid body: {message}"),
            Self::NotFound { what } => write!(f, "{what} not found"),
            Self::Cancelled => write!(f, "request superseded"),
            Self::Upstream { service, details } => write!(f, "{service} failed: {details}"),
            Self::Internal { details } => write!(f, "internal error: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Unauthorized { message }
            | Self::BadRequest { message }
            | Self::InvalidBody { message, .. } => message,
            Self::NotFound { what } => format!("{what} not found"),
            Self::Cancelled => "Superseded by a newer message".to_string(),
            Self::Upstream { service, details } => {
                tracing::error!(service, %details, "upstream failure");
                format!("{service} unavailable")
            }
            Self::Internal { details } => {
                tracing::error!(%details, "internal error");
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorBody::new(status, message))).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound { .. } => Self::NotFound { what: "Session" },
            SessionError::Cancelled { .. } => Self::Cancelled,
            SessionError::StorageFailed { reason } => Self::Internal { details: reason },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Internal {
            details: e.to_string(),
        }
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(e: AuthenticationError) -> Self {
        match &e {
            AuthenticationError::Rejected { .. } | AuthenticationError::InvalidToken { .. } => {
                tracing::debug!(error = %e, "authentication refused");
                Self::unauthorized(e.user_message())
            }
            AuthenticationError::ProviderError { .. } | AuthenticationError::InvalidConfig { .. } => {
                Self::Upstream {
                    service: "Identity provider",
                    details: e.to_string(),
                }
            }
        }
    }
}
