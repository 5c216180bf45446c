//! Error types for the conversation crate.

use nexus_core::ChatSessionId;
use std::fmt;

/// Errors from session operations.
///
/// A session owned by someone else is reported as `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session not found.
    NotFound { id: ChatSessionId },
    /// The request writing to the session was cancelled.
    Cancelled { id: ChatSessionId },
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "session not found: {id}"),
            Self::Cancelled { id } => write!(f, "write to session {id} was cancelled"),
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let id = ChatSessionId::new();
        let err = SessionError::NotFound { id };
        assert!(err.to_string().contains("session not found"));
        assert!(err.to_string().contains("chat_"));
    }
}
