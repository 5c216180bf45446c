//! Message types for chat transcripts.

use chrono::{DateTime, Utc};
use nexus_ai::{ContentKind, ContentRole, HistoryTurn, InferenceResult};
use nexus_core::MessageId;
use serde::{Deserialize, Serialize};

/// Text of the message every new session opens with.
pub const GREETING: &str = "I am Nexus. Select your model paradigm. Malevolent is direct and unfiltered. Infinite Perspective provides structured data.";

/// Stands in for a reply with no text.
pub const EMPTY_REPLY: &str = "No response generated.";

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The human user.
    User,
    /// Nexus.
    Model,
}

impl From<MessageRole> for ContentRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => Self::User,
            MessageRole::Model => Self::Model,
        }
    }
}

/// A message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Message role.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
    /// How `content` is rendered.
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
    /// Data URI of an attached image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Message {
    /// Creates a new message.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            kind,
            timestamp: Utc::now(),
            image_url: None,
        }
    }

    /// Creates a plain text user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, ContentKind::Text)
    }

    /// Creates the model's reply from a dispatch result.
    ///
    /// A blank reply that is not an image becomes [`EMPTY_REPLY`].
    #[must_use]
    pub fn from_result(result: InferenceResult) -> Self {
        let (text, kind) = if result.text.trim().is_empty() && result.kind != ContentKind::Image {
            (EMPTY_REPLY.to_string(), ContentKind::Text)
        } else {
            (result.text, result.kind)
        };
        let mut message = Self::new(MessageRole::Model, text, kind);
        message.image_url = result.image_url;
        message
    }

    /// Creates the session greeting.
    #[must_use]
    pub fn greeting() -> Self {
        Self::new(MessageRole::Model, GREETING, ContentKind::Text)
    }

    /// Converts the message into a history turn for the backend.
    #[must_use]
    pub fn to_history_turn(&self) -> HistoryTurn {
        HistoryTurn {
            role: self.role.into(),
            text: self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_keeps_image() {
        let message = Message::from_result(InferenceResult::image(
            "Visual synthesis complete.",
            "data:image/png;base64,AAAA",
        ));

        assert_eq!(message.role, MessageRole::Model);
        assert_eq!(message.kind, ContentKind::Image);
        assert_eq!(
            message.image_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn blank_reply_gets_placeholder() {
        let message = Message::from_result(InferenceResult::json("  "));
        assert_eq!(message.content, EMPTY_REPLY);
        assert_eq!(message.kind, ContentKind::Text);

        let image = Message::from_result(InferenceResult::image("", "data:image/png;base64,AA"));
        assert_eq!(image.content, "");
        assert_eq!(image.kind, ContentKind::Image);
    }

    #[test]
    fn history_turn_roles() {
        assert_eq!(
            Message::user("hi").to_history_turn(),
            HistoryTurn::user("hi")
        );
        assert_eq!(
            Message::greeting().to_history_turn().role,
            ContentRole::Model
        );
    }

    #[test]
    fn wire_shape() {
        let json = serde_json::to_value(Message::user("hello")).expect("serialize");
        assert_eq!(json["role"], "user");
        assert_eq!(json["type"], "text");
        assert!(json.get("imageUrl").is_none());
    }
}
