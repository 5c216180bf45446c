//! Chat session transcripts.
//!
//! A session is an append-only list of messages owned by one user. It opens
//! with the Nexus greeting, which is shown to the user but never sent to the
//! backend as history.

use crate::error::SessionError;
use crate::message::{Message, MessageRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_ai::HistoryTurn;
use nexus_core::{ChatSessionId, UserId};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

const TITLE_LIMIT: usize = 50;

/// A chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier.
    pub id: ChatSessionId,
    /// The user who owns this session.
    pub user_id: UserId,
    messages: Vec<Message>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When a message was last appended.
    pub last_active_at: DateTime<Utc>,
    /// Title taken from the first user message.
    #[serde(default)]
    pub title: Option<String>,
}

impl ChatSession {
    /// Creates a session seeded with the greeting.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ChatSessionId::new(),
            user_id,
            messages: vec![Message::greeting()],
            created_at: now,
            last_active_at: now,
            title: None,
        }
    }

    /// Appends a message.
    pub fn append(&mut self, message: Message) {
        if self.title.is_none() && message.role == MessageRole::User {
            self.title = Some(title_from(&message.content));
        }
        self.messages.push(message);
        self.last_active_at = Utc::now();
    }

    /// All messages, greeting first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages, greeting included.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the last message.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Turns to send to the backend: everything after the greeting.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryTurn> {
        self.messages
            .iter()
            .skip(1)
            .map(Message::to_history_turn)
            .collect()
    }
}

fn title_from(content: &str) -> String {
    let content = content.trim();
    if content.chars().count() > TITLE_LIMIT {
        let head: String = content.chars().take(TITLE_LIMIT - 3).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}

/// Trait for session storage.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Creates a new session for `user_id`.
    async fn create_session(&self, user_id: UserId) -> Result<ChatSession, SessionError>;

    /// Gets a session owned by `user_id`.
    async fn get_session(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
    ) -> Result<ChatSession, SessionError>;

    /// Appends messages in order and returns the updated session.
    async fn append_messages(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
        messages: Vec<Message>,
    ) -> Result<ChatSession, SessionError>;

    /// Appends messages like `append_messages` unless `cancel` has fired.
    ///
    /// The token is checked under the same write that appends, so a request
    /// cancelled before the append never lands in the transcript.
    async fn append_unless_cancelled(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
        messages: Vec<Message>,
        cancel: &CancellationToken,
    ) -> Result<ChatSession, SessionError>;

    /// Lists the sessions of a user, most recently active first.
    async fn list_sessions(&self, user_id: &UserId) -> Result<Vec<ChatSession>, SessionError>;

    /// Ends a session and discards its transcript.
    async fn end_session(&self, id: ChatSessionId, user_id: &UserId)
    -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::GREETING;
    use nexus_ai::{ContentRole, InferenceResult};

    #[test]
    fn session_opens_with_greeting() {
        let session = ChatSession::new(UserId::new("u1"));

        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages()[0].content, GREETING);
        assert_eq!(session.messages()[0].role, MessageRole::Model);
    }

    #[test]
    fn history_excludes_greeting() {
        let mut session = ChatSession::new(UserId::new("u1"));
        assert!(session.history().is_empty());

        session.append(Message::user("hello"));
        session.append(Message::from_result(InferenceResult::text("What.")));

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], HistoryTurn::user("hello"));
        assert_eq!(history[1].role, ContentRole::Model);
    }

    #[test]
    fn messages_keep_arrival_order() {
        let mut session = ChatSession::new(UserId::new("u1"));
        for text in ["one", "two", "three"] {
            session.append(Message::user(text));
        }

        let contents: Vec<&str> = session
            .messages()
            .iter()
            .skip(1)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["one", "two", "three"]);
        assert_eq!(session.last_message().map(|m| m.content.as_str()), Some("three"));
    }

    #[test]
    fn title_from_first_user_message() {
        let mut session = ChatSession::new(UserId::new("u1"));
        session.append(Message::user("What's the weather today?"));
        session.append(Message::user("And tomorrow?"));

        assert_eq!(session.title.as_deref(), Some("What's the weather today?"));
    }

    #[test]
    fn long_title_is_truncated_on_char_boundary() {
        let mut session = ChatSession::new(UserId::new("u1"));
        session.append(Message::user("é".repeat(80)));

        let title = session.title.expect("title");
        assert_eq!(title.chars().count(), TITLE_LIMIT);
        assert!(title.ends_with("..."));
    }
}
