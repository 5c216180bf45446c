//! Router assembly.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::routes::{self, chat, keys, presentations, sandbox};
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Identity
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/federated", post(auth::federated))
        .route("/auth/me", get(auth::me))
        // Chat
        .route(
            "/api/chat/sessions",
            get(chat::list_sessions).post(chat::create_session),
        )
        .route(
            "/api/chat/sessions/{id}",
            get(chat::get_session).delete(chat::end_session),
        )
        .route("/api/chat/sessions/{id}/messages", post(chat::post_message))
        // Records
        .route("/api/keys", get(keys::list_keys).post(keys::create_key))
        .route(
            "/api/presentations",
            get(presentations::list_presentations).post(presentations::save_presentation),
        )
        .route("/api/test-request", post(sandbox::test_request))
        // Gateway
        .route("/v1/generate", post(sandbox::generate))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
