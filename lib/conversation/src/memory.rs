//! In-process session storage.

use crate::error::SessionError;
use crate::message::Message;
use crate::session::{ChatSession, SessionManager};
use async_trait::async_trait;
use nexus_core::{ChatSessionId, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Sessions kept per user before the least recently active is evicted.
pub const MAX_SESSIONS_PER_USER: usize = 50;

/// Keeps sessions in memory for the lifetime of the process.
///
/// Each user holds at most `limit` sessions; creating one more evicts the
/// owner's least recently active session.
#[derive(Debug)]
pub struct InMemorySessionManager {
    sessions: RwLock<HashMap<ChatSessionId, ChatSession>>,
    limit: usize,
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::with_session_limit(MAX_SESSIONS_PER_USER)
    }
}

impl InMemorySessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps each user at `limit` sessions (at least one).
    #[must_use]
    pub fn with_session_limit(limit: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limit: limit.max(1),
        }
    }
}

fn evict_idlest(sessions: &mut HashMap<ChatSessionId, ChatSession>, user_id: &UserId) {
    let idlest = sessions
        .values()
        .filter(|s| &s.user_id == user_id)
        .min_by_key(|s| (s.last_active_at, s.created_at))
        .map(|s| s.id);
    if let Some(id) = idlest {
        sessions.remove(&id);
        debug!(session_id = %id, %user_id, "evicted idle chat session");
    }
}

fn append_owned(
    sessions: &mut HashMap<ChatSessionId, ChatSession>,
    id: ChatSessionId,
    user_id: &UserId,
    messages: Vec<Message>,
) -> Result<ChatSession, SessionError> {
    let session = sessions
        .get_mut(&id)
        .filter(|s| &s.user_id == user_id)
        .ok_or(SessionError::NotFound { id })?;

    for message in messages {
        session.append(message);
    }
    Ok(session.clone())
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn create_session(&self, user_id: UserId) -> Result<ChatSession, SessionError> {
        let session = ChatSession::new(user_id);
        debug!(session_id = %session.id, user_id = %session.user_id, "created chat session");

        let mut sessions = self.sessions.write().await;
        let mut owned = sessions
            .values()
            .filter(|s| s.user_id == session.user_id)
            .count();
        while owned >= self.limit {
            evict_idlest(&mut sessions, &session.user_id);
            owned -= 1;
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
    ) -> Result<ChatSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .ok_or(SessionError::NotFound { id })
    }

    async fn append_messages(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
        messages: Vec<Message>,
    ) -> Result<ChatSession, SessionError> {
        let mut sessions = self.sessions.write().await;
        append_owned(&mut sessions, id, user_id, messages)
    }

    async fn append_unless_cancelled(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
        messages: Vec<Message>,
        cancel: &CancellationToken,
    ) -> Result<ChatSession, SessionError> {
        let mut sessions = self.sessions.write().await;
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled { id });
        }
        append_owned(&mut sessions, id, user_id, messages)
    }

    async fn list_sessions(&self, user_id: &UserId) -> Result<Vec<ChatSession>, SessionError> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_active_at.cmp(&a.last_active_at));
        Ok(sessions)
    }

    async fn end_session(
        &self,
        id: ChatSessionId,
        user_id: &UserId,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(s) if &s.user_id == user_id => {
                sessions.remove(&id);
                debug!(session_id = %id, "ended chat session");
                Ok(())
            }
            _ => Err(SessionError::NotFound { id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_ai::InferenceResult;
    use std::time::Duration;

    #[tokio::test]
    async fn create_and_get() {
        let manager = InMemorySessionManager::new();
        let owner = UserId::new("alice");
        let session = manager.create_session(owner.clone()).await.unwrap();

        let fetched = manager.get_session(session.id, &owner).await.unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.message_count(), 1);
    }

    #[tokio::test]
    async fn other_users_cannot_see_session() {
        let manager = InMemorySessionManager::new();
        let session = manager.create_session(UserId::new("alice")).await.unwrap();

        let err = manager
            .get_session(session.id, &UserId::new("mallory"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound { id: session.id });

        let err = manager
            .append_messages(session.id, &UserId::new("mallory"), vec![Message::user("x")])
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::NotFound { id: session.id });
    }

    #[tokio::test]
    async fn append_keeps_order() {
        let manager = InMemorySessionManager::new();
        let owner = UserId::new("alice");
        let session = manager.create_session(owner.clone()).await.unwrap();

        let updated = manager
            .append_messages(
                session.id,
                &owner,
                vec![
                    Message::user("hello"),
                    Message::from_result(InferenceResult::text("What.")),
                ],
            )
            .await
            .unwrap();

        assert_eq!(updated.message_count(), 3);
        assert_eq!(updated.messages()[1].content, "hello");
        assert_eq!(updated.messages()[2].content, "What.");
    }

    #[tokio::test]
    async fn end_session_discards_transcript() {
        let manager = InMemorySessionManager::new();
        let owner = UserId::new("alice");
        let session = manager.create_session(owner.clone()).await.unwrap();

        manager.end_session(session.id, &owner).await.unwrap();

        assert!(manager.get_session(session.id, &owner).await.is_err());
        assert!(manager.end_session(session.id, &owner).await.is_err());
    }

    #[tokio::test]
    async fn list_only_own_sessions() {
        let manager = InMemorySessionManager::new();
        let alice = UserId::new("alice");
        manager.create_session(alice.clone()).await.unwrap();
        manager.create_session(alice.clone()).await.unwrap();
        manager.create_session(UserId::new("bob")).await.unwrap();

        assert_eq!(manager.list_sessions(&alice).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn session_count_is_capped_per_user() {
        let manager = InMemorySessionManager::with_session_limit(2);
        let alice = UserId::new("alice");
        let first = manager.create_session(alice.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = manager.create_session(alice.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        manager
            .append_messages(first.id, &alice, vec![Message::user("still here")])
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let bob = manager.create_session(UserId::new("bob")).await.unwrap();

        let third = manager.create_session(alice.clone()).await.unwrap();

        let ids: Vec<_> = manager
            .list_sessions(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, [third.id, first.id]);
        assert!(manager.get_session(second.id, &alice).await.is_err());
        assert!(manager.get_session(bob.id, &UserId::new("bob")).await.is_ok());
    }

    #[tokio::test]
    async fn default_limit_bounds_one_user() {
        let manager = InMemorySessionManager::new();
        let alice = UserId::new("alice");
        for _ in 0..MAX_SESSIONS_PER_USER + 5 {
            manager.create_session(alice.clone()).await.unwrap();
        }

        assert_eq!(
            manager.list_sessions(&alice).await.unwrap().len(),
            MAX_SESSIONS_PER_USER
        );
    }

    #[tokio::test]
    async fn cancelled_append_leaves_transcript_untouched() {
        let manager = InMemorySessionManager::new();
        let owner = UserId::new("alice");
        let session = manager.create_session(owner.clone()).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = manager
            .append_unless_cancelled(session.id, &owner, vec![Message::user("late")], &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::Cancelled { id: session.id });
        assert_eq!(
            manager.get_session(session.id, &owner).await.unwrap().message_count(),
            1
        );

        let live = CancellationToken::new();
        let updated = manager
            .append_unless_cancelled(session.id, &owner, vec![Message::user("on time")], &live)
            .await
            .unwrap();
        assert_eq!(updated.message_count(), 2);
    }
}
