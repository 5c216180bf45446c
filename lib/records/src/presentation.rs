//! Saved slide decks.

use chrono::{DateTime, Utc};
use nexus_core::{PresentationId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A slide deck saved by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRecord {
    /// Record identifier.
    pub id: PresentationId,
    /// Owner.
    pub user_id: UserId,
    /// Deck payload, always normalized.
    pub data: Value,
    /// When the deck was saved.
    pub created_at: DateTime<Utc>,
}

impl PresentationRecord {
    /// Creates a record for `data`, normalizing it.
    #[must_use]
    pub fn new(user_id: UserId, data: Value) -> Self {
        Self {
            id: PresentationId::new(),
            user_id,
            data: normalize_payload(data),
            created_at: Utc::now(),
        }
    }

    /// Deck title from `presentation_metadata.title`, if present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.data
            .get("presentation_metadata")?
            .get("title")?
            .as_str()
    }

    /// Number of slides in the deck.
    #[must_use]
    pub fn slide_count(&self) -> usize {
        self.data
            .get("slides")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// A one-element array becomes its element; anything else is kept as is.
#[must_use]
pub fn normalize_payload(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_element_array_is_stored_as_object() {
        let record = PresentationRecord::new(
            UserId::new("u1"),
            json!([{"presentation_metadata": {"title": "Tides"}, "slides": [{}, {}]}]),
        );

        assert!(record.data.is_object());
        assert_eq!(record.title(), Some("Tides"));
        assert_eq!(record.slide_count(), 2);
    }

    #[test]
    fn normalize_only_touches_single_arrays() {
        assert_eq!(normalize_payload(json!([1, 2])), json!([1, 2]));
        assert_eq!(normalize_payload(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(normalize_payload(json!([])), json!([]));
    }

    #[test]
    fn untitled_deck() {
        let record = PresentationRecord::new(UserId::new("u1"), json!({"slides": "nope"}));
        assert_eq!(record.title(), None);
        assert_eq!(record.slide_count(), 0);
    }
}
