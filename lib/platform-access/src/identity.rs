//! Identity provider access.
//!
//! [`IdentityProvider`] is the seam the server authenticates through.
//! [`IdentityToolkitClient`] implements it over the identity toolkit REST API
//! with a single web API key.

use crate::error::{AuthenticationError, code_from_rest_message};
use crate::session::AuthSession;
use crate::user::UserProfile;
use async_trait::async_trait;
use chrono::Duration;
use nexus_core::UserId;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Default API root.
pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

const PROVIDER_NAME: &str = "identitytoolkit";
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Operations nexus needs from the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an email/password account and signs it in.
    async fn register(&self, email: &str, password: &str)
    -> Result<AuthSession, AuthenticationError>;

    /// Signs in with email and password.
    async fn sign_in(&self, email: &str, password: &str)
    -> Result<AuthSession, AuthenticationError>;

    /// Signs in with an ID token from a federated provider such as `google.com`.
    async fn sign_in_federated(
        &self,
        provider_id: &str,
        id_token: &str,
    ) -> Result<AuthSession, AuthenticationError>;

    /// Resolves an ID token to the user it was issued to.
    async fn lookup(&self, id_token: &str) -> Result<UserProfile, AuthenticationError>;
}

/// Connection settings for [`IdentityToolkitClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Web API key of the project.
    pub api_key: String,
    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_IDENTITY_BASE_URL.to_string()
}

/// REST client for the identity toolkit API.
#[derive(Clone)]
pub struct IdentityToolkitClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl IdentityToolkitClient {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be built.
    pub fn new(config: IdentityConfig) -> nexus_core::Result<Self, AuthenticationError> {
        if config.api_key.trim().is_empty() {
            return Err(AuthenticationError::InvalidConfig {
                reason: "identity API key is empty".to_string(),
            }
            .into());
        }

        let client = Client::builder()
            .build()
            .map_err(|e| AuthenticationError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{method}", self.base_url)
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, AuthenticationError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(provider_error)?;

        let status = response.status();
        let text = response.text().await.map_err(provider_error)?;

        if !status.is_success() {
            let err = parse_error_body(&text).unwrap_or_else(|| AuthenticationError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("HTTP {status}"),
            });
            debug!(method, status = %status, error = %err, "identity call rejected");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(method, error = %e, "unexpected identity response");
            provider_error(e)
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    #[instrument(skip_all)]
    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthenticationError> {
        let response: TokenResponse = self
            .call("signUp", &PasswordRequest::new(email, password))
            .await?;
        Ok(response.into_session())
    }

    #[instrument(skip_all)]
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthenticationError> {
        let response: TokenResponse = self
            .call("signInWithPassword", &PasswordRequest::new(email, password))
            .await?;
        Ok(response.into_session())
    }

    #[instrument(skip(self, id_token))]
    async fn sign_in_federated(
        &self,
        provider_id: &str,
        id_token: &str,
    ) -> Result<AuthSession, AuthenticationError> {
        let response: TokenResponse = self
            .call("signInWithIdp", &IdpRequest::new(provider_id, id_token))
            .await?;
        Ok(response.into_session())
    }

    #[instrument(skip_all)]
    async fn lookup(&self, id_token: &str) -> Result<UserProfile, AuthenticationError> {
        let response: LookupResponse = self.call("lookup", &LookupRequest { id_token }).await?;
        response
            .users
            .into_iter()
            .next()
            .map(AccountInfo::into_profile)
            .ok_or_else(|| AuthenticationError::InvalidToken {
                reason: "no user for token".to_string(),
            })
    }
}

fn provider_error(e: impl std::fmt::Display) -> AuthenticationError {
    AuthenticationError::ProviderError {
        provider: PROVIDER_NAME.to_string(),
        reason: e.to_string(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

impl<'a> PasswordRequest<'a> {
    fn new(email: &'a str, password: &'a str) -> Self {
        Self {
            email,
            password,
            return_secure_token: true,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

impl IdpRequest {
    fn new(provider_id: &str, id_token: &str) -> Self {
        Self {
            post_body: format!(
                "id_token={}&providerId={}",
                urlencoding::encode(id_token),
                urlencoding::encode(provider_id)
            ),
            request_uri: "http://localhost",
            return_idp_credential: true,
            return_secure_token: true,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    /// Seconds, sent as a string.
    expires_in: Option<String>,
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_in = self
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        let profile = UserProfile {
            id: UserId::new(self.local_id),
            email: self.email.filter(|e| !e.is_empty()),
            display_name: self.display_name.filter(|n| !n.is_empty()),
            avatar_url: self.photo_url.filter(|u| !u.is_empty()),
        };

        AuthSession::new(
            self.id_token,
            self.refresh_token,
            Duration::try_seconds(expires_in)
                .unwrap_or_else(|| Duration::seconds(DEFAULT_EXPIRES_IN_SECS)),
            profile,
        )
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl AccountInfo {
    fn into_profile(self) -> UserProfile {
        UserProfile {
            id: UserId::new(self.local_id),
            email: self.email,
            display_name: self.display_name,
            avatar_url: self.photo_url,
        }
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Interprets an error body such as `{"error":{"code":400,"message":"EMAIL_EXISTS"}}`.
fn parse_error_body(body: &str) -> Option<AuthenticationError> {
    let wrapper: ErrorWrapper = serde_json::from_str(body).ok()?;
    let message = wrapper.error.message;

    if message.starts_with("INVALID_ID_TOKEN") || message.starts_with("TOKEN_EXPIRED") {
        return Some(AuthenticationError::InvalidToken { reason: message });
    }
    Some(AuthenticationError::Rejected {
        code: code_from_rest_message(&message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn rejects_empty_api_key() {
        let config = IdentityConfig {
            api_key: String::new(),
            base_url: default_base_url(),
        };
        let built: nexus_core::Result<IdentityToolkitClient, AuthenticationError> =
            IdentityToolkitClient::new(config);
        let Err(report) = built else {
            panic!("empty key should be rejected");
        };
        assert!(matches!(
            report.current_context(),
            AuthenticationError::InvalidConfig { .. }
        ));
    }

    #[test]
    fn endpoint_format() {
        let client = IdentityToolkitClient::new(IdentityConfig {
            api_key: "web-key".to_string(),
            base_url: "http://localhost:9099/v1/".to_string(),
        })
        .expect("client");
        assert_eq!(
            client.endpoint("signUp"),
            "http://localhost:9099/v1/accounts:signUp"
        );
    }

    #[test]
    fn password_request_wire_format() {
        let json = serde_json::to_value(PasswordRequest::new("a@b.c", "hunter22")).expect("json");
        assert_eq!(json["email"], "a@b.c");
        assert_eq!(json["returnSecureToken"], true);
    }

    #[test]
    fn idp_request_carries_token() {
        let json = serde_json::to_value(IdpRequest::new("google.com", "tok")).expect("json");
        assert_eq!(json["postBody"], "id_token=tok&providerId=google.com");
        assert_eq!(json["returnSecureToken"], true);
    }

    #[test]
    fn idp_post_body_is_form_encoded() {
        let json = serde_json::to_value(IdpRequest::new("saml.acme", "a&b=c d")).expect("json");
        assert_eq!(json["postBody"], "id_token=a%26b%3Dc%20d&providerId=saml.acme");
    }

    #[test]
    fn oversized_expiry_does_not_panic() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"idToken": "t", "expiresIn": "9223372036854775807", "localId": "uid_1"}"#,
        )
        .expect("parse");

        let session = response.into_session();
        assert!(!session.is_expired());
        assert!(session.expires_at <= Utc::now() + Duration::hours(2));
    }

    #[test]
    fn token_response_becomes_session() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "idToken": "eyJ...",
                "refreshToken": "r1",
                "expiresIn": "3600",
                "localId": "uid_42",
                "email": "ada@example.com",
                "displayName": ""
            }"#,
        )
        .expect("parse");

        let session = response.into_session();
        assert_eq!(session.id_token, "eyJ...");
        assert_eq!(session.profile.id, UserId::new("uid_42"));
        assert_eq!(session.profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.profile.display_name, None);
        assert!(!session.is_expired());
    }

    #[test]
    fn lookup_response_profile() {
        let response: LookupResponse = serde_json::from_str(
            r#"{"users": [{"localId": "uid_7", "email": "x@y.z", "photoUrl": "https://img"}]}"#,
        )
        .expect("parse");
        let profile = response
            .users
            .into_iter()
            .next()
            .map(AccountInfo::into_profile)
            .expect("user");
        assert_eq!(profile.id.as_str(), "uid_7");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://img"));
    }

    #[test]
    fn error_bodies() {
        assert_eq!(
            parse_error_body(r#"{"error": {"code": 400, "message": "EMAIL_EXISTS"}}"#),
            Some(AuthenticationError::Rejected {
                code: "auth/email-already-in-use".to_string()
            })
        );
        assert!(matches!(
            parse_error_body(r#"{"error": {"code": 400, "message": "INVALID_ID_TOKEN"}}"#),
            Some(AuthenticationError::InvalidToken { .. })
        ));
        assert_eq!(parse_error_body("<html>bad gateway</html>"), None);
    }
}
