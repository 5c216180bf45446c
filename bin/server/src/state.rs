//! Shared application state.

use crate::inflight::InflightRequests;
use nexus_ai::ModelDispatcher;
use nexus_conversation::SessionManager;
use nexus_platform_access::IdentityProvider;
use nexus_records::RecordAccess;
use std::sync::Arc;

/// Everything handlers need, constructed once at startup.
pub struct AppState {
    /// Routes messages to the inference backend.
    pub dispatcher: ModelDispatcher,
    /// Chat transcripts.
    pub sessions: Arc<dyn SessionManager>,
    /// API keys and saved presentations.
    pub records: RecordAccess,
    /// Identity provider client.
    pub identity: Arc<dyn IdentityProvider>,
    /// Cancellation handles of running chat requests.
    pub inflight: InflightRequests,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        dispatcher: ModelDispatcher,
        sessions: Arc<dyn SessionManager>,
        records: RecordAccess,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            dispatcher,
            sessions,
            records,
            identity,
            inflight: InflightRequests::new(),
        }
    }
}
