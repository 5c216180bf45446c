//! Error types for the platform-access crate.
//!
//! `AuthenticationError` carries the provider's error code so the server can
//! log it, while [`AuthenticationError::user_message`] produces the text that
//! is safe to show on the sign-in form.

use std::fmt;

const VENDOR_PREFIX: &str = "Firebase: ";
const CODE_NAMESPACE: &str = "auth/";

/// Errors from authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The provider refused the credentials.
    Rejected { code: String },
    /// The presented token is not valid.
    InvalidToken { reason: String },
    /// Identity provider could not be reached or answered nonsense.
    ProviderError { provider: String, reason: String },
    /// Client configuration is unusable.
    InvalidConfig { reason: String },
}

impl AuthenticationError {
    /// Message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { code } => readable_code(code),
            Self::InvalidToken { .. } => "Session expired. Sign in again.".to_string(),
            Self::ProviderError { .. } | Self::InvalidConfig { .. } => {
                "Authentication failed".to_string()
            }
        }
    }
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { code } => write!(f, "authentication rejected: {code}"),
            Self::InvalidToken { reason } => write!(f, "invalid token: {reason}"),
            Self::ProviderError { provider, reason } => {
                write!(f, "identity provider '{provider}' error: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid identity configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Strips vendor prefixes from a provider message.
///
/// Only the first occurrence of each prefix is removed.
#[must_use]
pub fn clean_provider_message(message: &str) -> String {
    message
        .replacen(VENDOR_PREFIX, "", 1)
        .replacen(CODE_NAMESPACE, "", 1)
}

/// Turns `auth/email-already-in-use` into `Email already in use`.
fn readable_code(code: &str) -> String {
    let cleaned = clean_provider_message(code).replace(['-', '_'], " ");
    let cleaned = cleaned.trim();
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Authentication failed".to_string(),
    }
}

/// Maps an identity toolkit REST error message to a namespaced error code.
///
/// REST messages look like `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
#[must_use]
pub fn code_from_rest_message(message: &str) -> String {
    let head = message.split(" : ").next().unwrap_or(message).trim();
    let code = match head {
        "EMAIL_EXISTS" => "email-already-in-use",
        "EMAIL_NOT_FOUND" => "user-not-found",
        "INVALID_PASSWORD" => "wrong-password",
        "INVALID_LOGIN_CREDENTIALS" => "invalid-credential",
        "INVALID_EMAIL" => "invalid-email",
        "WEAK_PASSWORD" => "weak-password",
        "USER_DISABLED" => "user-disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "too-many-requests",
        "INVALID_ID_TOKEN" => "invalid-user-token",
        "TOKEN_EXPIRED" => "user-token-expired",
        other => return format!("{CODE_NAMESPACE}{}", other.to_lowercase().replace('_', "-")),
    };
    format!("{CODE_NAMESPACE}{code}")
}
