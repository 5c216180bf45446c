//! Error types for the AI crate.
//!
//! `LlmError` covers everything that can go wrong talking to an inference
//! backend. The dispatcher never lets these reach its callers; they are logged
//! and replaced by a fixed user-facing message.

use std::fmt;

/// Errors from inference backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Request could not be sent.
    RequestFailed { reason: String },
    /// The backend answered with a non-success status.
    Api { status: u16, message: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "inference request failed: {reason}")
            }
            Self::Api { status, message } => {
                write!(f, "inference API returned {status}: {message}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse inference response: {reason}")
            }
            Self::Timeout => write!(f, "inference request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid inference configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::ResponseParseFailed {
                reason: err.to_string(),
            }
        } else {
            Self::RequestFailed {
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = LlmError::Api {
            status: 400,
            message: "INVALID_ARGUMENT: bad model".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "inference API returned 400: INVALID_ARGUMENT: bad model"
        );
    }

    #[test]
    fn rate_limited_display() {
        let with_delay = LlmError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(with_delay.to_string().contains("30s"));
        let without = LlmError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(without.to_string(), "rate limited");
    }
}
