//! Response types shared by the API handlers.

use chrono::{DateTime, Utc};
use nexus_conversation::{ChatSession, Message, RenderedContent, render_message};
use nexus_core::{ChatSessionId, PresentationId};
use nexus_records::PresentationRecord;
use serde::Serialize;
use serde_json::Value;

/// Title shown for a deck without one.
pub const UNTITLED_DECK: &str = "Untitled Deck";

/// A transcript message together with its display form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub rendered: RenderedContent,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            rendered: render_message(message),
            message: message.clone(),
        }
    }
}

/// A full chat transcript.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: ChatSessionId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub messages: Vec<MessageView>,
}

impl From<&ChatSession> for SessionView {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id,
            title: session.title.clone(),
            created_at: session.created_at,
            last_active_at: session.last_active_at,
            messages: session.messages().iter().map(MessageView::from).collect(),
        }
    }
}

/// A chat session in a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: ChatSessionId,
    pub title: Option<String>,
    pub message_count: usize,
    pub last_active_at: DateTime<Utc>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id,
            title: session.title.clone(),
            message_count: session.message_count(),
            last_active_at: session.last_active_at,
        }
    }
}

/// The user message and the reply appended by one exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeView {
    pub session_id: ChatSessionId,
    pub title: Option<String>,
    pub user_message: MessageView,
    pub reply: MessageView,
}

/// A saved deck in a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSummary {
    pub id: PresentationId,
    pub title: String,
    pub slide_count: usize,
    pub created_at: DateTime<Utc>,
    pub data: Value,
}

impl From<PresentationRecord> for PresentationSummary {
    fn from(record: PresentationRecord) -> Self {
        Self {
            id: record.id,
            title: record.title().unwrap_or(UNTITLED_DECK).to_string(),
            slide_count: record.slide_count(),
            created_at: record.created_at,
            data: record.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::UserId;
    use serde_json::json;

    #[test]
    fn deck_without_title_is_untitled() {
        let record = PresentationRecord::new(UserId::new("u1"), json!({"slides": [{}, {}]}));
        let summary = PresentationSummary::from(record);

        assert_eq!(summary.title, "Untitled Deck");
        assert_eq!(summary.slide_count, 2);
    }

    #[test]
    fn message_view_carries_render() {
        let session = ChatSession::new(UserId::new("u1"));
        let view = SessionView::from(&session);
        let json = serde_json::to_value(&view).expect("json");

        let greeting = &json["messages"][0];
        assert_eq!(greeting["role"], "model");
        assert_eq!(greeting["type"], "text");
        assert_eq!(greeting["rendered"]["view"], "text");
    }
}
