//! User profile as reported by the identity provider.

use nexus_core::UserId;
use serde::{Deserialize, Serialize};

/// An authenticated user.
///
/// The identity provider owns the user record; nexus only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Provider-issued user identifier.
    pub id: UserId,
    /// Email address, if the provider has one.
    pub email: Option<String>,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Avatar image URL, if set.
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only an identifier.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
            avatar_url: None,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name to greet the user with: display name, then email, then id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_display_name() {
        let mut profile = UserProfile::new(UserId::new("uid_1")).with_email("a@example.com");
        assert_eq!(profile.label(), "a@example.com");

        profile.display_name = Some("Ada".to_string());
        assert_eq!(profile.label(), "Ada");

        assert_eq!(UserProfile::new(UserId::new("uid_2")).label(), "uid_2");
    }
}
