//! Error types for record storage.

use std::fmt;

/// Errors from record store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Could not reach the store.
    ConnectionFailed { reason: String },
    /// Schema migration failed.
    MigrationFailed { reason: String },
    /// A query was rejected or failed.
    QueryFailed { reason: String },
    /// A stored row could not be decoded.
    InvalidRecord { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "record store connection failed: {reason}")
            }
            Self::MigrationFailed { reason } => {
                write!(f, "record store migration failed: {reason}")
            }
            Self::QueryFailed { reason } => write!(f, "record query failed: {reason}"),
            Self::InvalidRecord { reason } => write!(f, "invalid stored record: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Decode(inner) => Self::InvalidRecord {
                reason: inner.to_string(),
            },
            other => Self::QueryFailed {
                reason: other.to_string(),
            },
        }
    }
}
