//! API keys for the generation gateway.

use chrono::{DateTime, Utc};
use nexus_core::{ApiKeyId, UserId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix of every generated key.
pub const KEY_PREFIX: &str = "nx_";
/// Name that unlocks the unlimited output tier.
pub const UNLIMITED_KEY_NAME: &str = "InfiniteVoid";

const RANDOM_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A stored API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    /// Record identifier.
    pub id: ApiKeyId,
    /// The secret presented by API clients.
    pub key: String,
    /// User-chosen label.
    pub name: String,
    /// Owner.
    pub user_id: UserId,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
    /// Inactive keys are never returned by lookups.
    pub active: bool,
}

impl ApiKey {
    /// Issues a fresh active key for `user_id`.
    #[must_use]
    pub fn issue(user_id: UserId, name: impl Into<String>) -> Self {
        let created_at = Utc::now();
        let millis = u64::try_from(created_at.timestamp_millis()).unwrap_or_default();
        Self {
            id: ApiKeyId::new(),
            key: generate_key_string(&mut rand::thread_rng(), millis),
            name: name.into(),
            user_id,
            created_at,
            active: true,
        }
    }

    /// Returns true if this key gets the unlimited output tier.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.name == UNLIMITED_KEY_NAME
    }
}

/// Builds a key of the form `nx_<9 random base36 chars>_<millis in base36>`.
#[must_use]
pub fn generate_key_string<R: Rng + ?Sized>(rng: &mut R, epoch_millis: u64) -> String {
    let random: String = (0..RANDOM_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{KEY_PREFIX}{random}_{}", to_base36(epoch_millis))
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
