//! Signed-in sessions issued by the identity provider.

use crate::user::UserProfile;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens and profile returned by a successful sign-in.
///
/// The ID token is the bearer credential for the nexus API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Short-lived ID token.
    pub id_token: String,
    /// Token used to obtain a fresh ID token.
    pub refresh_token: String,
    /// When `id_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub profile: UserProfile,
}

impl AuthSession {
    /// Creates a session expiring `expires_in` from now, saturating at the
    /// latest representable time.
    #[must_use]
    pub fn new(
        id_token: String,
        refresh_token: String,
        expires_in: Duration,
        profile: UserProfile,
    ) -> Self {
        Self {
            id_token,
            refresh_token,
            expires_at: Utc::now()
                .checked_add_signed(expires_in)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            profile,
        }
    }

    /// Returns true if the ID token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::UserId;

    #[test]
    fn expiry() {
        let profile = UserProfile::new(UserId::new("u"));
        let live = AuthSession::new(
            "id".to_string(),
            "refresh".to_string(),
            Duration::hours(1),
            profile.clone(),
        );
        assert!(!live.is_expired());

        let stale = AuthSession::new(
            "id".to_string(),
            "refresh".to_string(),
            Duration::seconds(-1),
            profile,
        );
        assert!(stale.is_expired());
    }

    #[test]
    fn huge_lifetime_saturates() {
        let session = AuthSession::new(
            "id".to_string(),
            "refresh".to_string(),
            Duration::MAX,
            UserProfile::new(UserId::new("u")),
        );
        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!session.is_expired());
    }

    #[test]
    fn serializes_camel_case() {
        let session = AuthSession::new(
            "id".to_string(),
            "refresh".to_string(),
            Duration::hours(1),
            UserProfile::new(UserId::new("u")),
        );
        let json = serde_json::to_value(&session).expect("serialize");
        assert_eq!(json["idToken"], "id");
        assert_eq!(json["profile"]["id"], "u");
    }
}
