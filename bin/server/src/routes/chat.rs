//! Chat session handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use nexus_ai::{ConverseRequest, GenerationConfig, ModelPersona};
use nexus_conversation::Message;
use nexus_core::ChatSessionId;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::types::{ExchangeView, MessageView, SessionSummary, SessionView};

/// A message posted to a session.
#[derive(Debug, Deserialize)]
pub struct PostMessage {
    message: String,
    #[serde(default)]
    persona: ModelPersona,
    #[serde(default)]
    overrides: GenerationConfig,
}

fn parse_session_id(raw: &str) -> Result<ChatSessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound { what: "Session" })
}

/// Opens a session seeded with the greeting.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let session = state.sessions.create_session(user.id).await?;
    Ok((StatusCode::CREATED, Json(SessionView::from(&session))))
}

/// Lists the caller's sessions.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state.sessions.list_sessions(&user.id).await?;
    Ok(Json(sessions.iter().map(SessionSummary::from).collect()))
}

/// Returns a transcript with rendered messages.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let session = state.sessions.get_session(id, &user.id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// Answers a message and appends the exchange to the transcript.
///
/// A newer message to the same session supersedes this one, which then
/// appends nothing and answers 409.
#[instrument(skip_all, fields(session_id = %id))]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PostMessage>,
) -> Result<Json<ExchangeView>, ApiError> {
    let id = parse_session_id(&id)?;
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("Message must not be empty"));
    }

    // Only the owner may supersede a running request.
    state.sessions.get_session(id, &user.id).await?;
    let guard = state.inflight.begin(id);
    // Read after registering so history holds anything the superseded request committed.
    let session = state.sessions.get_session(id, &user.id).await?;

    let request = ConverseRequest::new(body.message.clone(), body.persona)
        .with_history(session.history())
        .with_overrides(body.overrides);

    let result = state
        .dispatcher
        .converse_cancellable(&request, guard.token())
        .await
        .ok_or(ApiError::Cancelled)?;

    let user_message = Message::user(body.message);
    let reply = Message::from_result(result);
    let session = state
        .sessions
        .append_unless_cancelled(
            id,
            &user.id,
            vec![user_message.clone(), reply.clone()],
            guard.token(),
        )
        .await
        .inspect_err(|e| debug!(error = %e, "exchange not appended"))?;
    drop(guard);

    Ok(Json(ExchangeView {
        session_id: session.id,
        title: session.title,
        user_message: MessageView::from(&user_message),
        reply: MessageView::from(&reply),
    }))
}

/// Ends a session, abandoning any running request.
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    state.sessions.end_session(id, &user.id).await?;
    state.inflight.cancel(id);
    Ok(StatusCode::NO_CONTENT)
}
