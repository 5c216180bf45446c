//! Cancellation handles for in-flight chat requests.
//!
//! Each chat session has at most one request whose result will be kept.
//! Starting a new one cancels its predecessor.

use nexus_core::ChatSessionId;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct Entry {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct Inner {
    next_generation: u64,
    entries: HashMap<ChatSessionId, Entry>,
}

/// Registry of the live request per chat session.
#[derive(Debug, Default)]
pub struct InflightRequests {
    inner: Mutex<Inner>,
}

impl InflightRequests {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new request for `session_id`, cancelling the previous one.
    ///
    /// The returned guard unregisters the request when dropped.
    pub fn begin(&self, session_id: ChatSessionId) -> InflightGuard<'_> {
        let token = CancellationToken::new();
        let mut inner = self.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;

        let previous = inner.entries.insert(
            session_id,
            Entry {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(%session_id, "cancelling superseded chat request");
            previous.token.cancel();
        }

        InflightGuard {
            registry: self,
            session_id,
            generation,
            token,
        }
    }

    /// Cancels whatever is running for `session_id`.
    pub fn cancel(&self, session_id: ChatSessionId) {
        if let Some(entry) = self.lock().entries.remove(&session_id) {
            entry.token.cancel();
        }
    }

    /// Returns true if a request is registered for `session_id`.
    #[must_use]
    pub fn is_running(&self, session_id: ChatSessionId) -> bool {
        self.lock().entries.contains_key(&session_id)
    }

    fn finish(&self, session_id: ChatSessionId, generation: u64) {
        let mut inner = self.lock();
        if inner
            .entries
            .get(&session_id)
            .is_some_and(|e| e.generation == generation)
        {
            inner.entries.remove(&session_id);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // The map stays consistent even if a holder panicked.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Live registration of one request.
#[derive(Debug)]
pub struct InflightGuard<'a> {
    registry: &'a InflightRequests,
    session_id: ChatSessionId,
    generation: u64,
    token: CancellationToken,
}

impl InflightGuard<'_> {
    /// Token that fires when this request is superseded.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.registry.finish(self.session_id, self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_cancels_previous() {
        let registry = InflightRequests::new();
        let session = ChatSessionId::new();

        let first = registry.begin(session);
        let second = registry.begin(session);

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
    }

    #[test]
    fn sessions_are_independent() {
        let registry = InflightRequests::new();
        let a = registry.begin(ChatSessionId::new());
        let _b = registry.begin(ChatSessionId::new());

        assert!(!a.token().is_cancelled());
    }

    #[test]
    fn stale_guard_does_not_unregister_successor() {
        let registry = InflightRequests::new();
        let session = ChatSessionId::new();

        let first = registry.begin(session);
        let second = registry.begin(session);
        drop(first);

        assert!(registry.is_running(session));
        drop(second);
        assert!(!registry.is_running(session));
    }

    #[test]
    fn cancel_fires_token() {
        let registry = InflightRequests::new();
        let session = ChatSessionId::new();
        let guard = registry.begin(session);

        registry.cancel(session);

        assert!(guard.token().is_cancelled());
        assert!(!registry.is_running(session));
    }
}
