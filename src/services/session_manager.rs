// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One question/answer exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub document_text: Option<String>,
    pub history: Vec<Turn>,
    pub last_active: Instant,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            document_text: None,
            history: Vec::new(),
            last_active: Instant::now(),
        }
    }
}

/// Per-client document text and chat history, keyed by session id.
///
/// Every mutation holds the map's write lock, so writes to a session never interleave.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a fresh session and return its id. Idle sessions are purged first.
    pub async fn create_session(&self) -> String {
        let purged = self.purge_expired().await;
        if purged > 0 {
            tracing::debug!(purged, "Purged idle sessions");
        }

        let id = Uuid::new_v4().to_string();
        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), Session::new(id.clone()));
        id
    }

    /// Ensure there's a live session with this id and mark it active. A session idle
    /// longer than the ttl is replaced by an empty one.
    pub async fn ensure_session(&self, id: &str) -> String {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let session = guard
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id));
        if now.duration_since(session.last_active) >= self.ttl {
            tracing::debug!(session_id = id, "Session expired, starting over");
            *session = Session::new(id);
        }
        session.last_active = now;
        id.to_string()
    }

    pub async fn document_text(&self, session_id: &str) -> Option<String> {
        let guard = self.inner.read().await;
        guard.get(session_id).and_then(|s| s.document_text.clone())
    }

    /// Replace the session's document. The previous text is dropped, not merged.
    pub async fn set_document_text(&self, session_id: &str, text: impl Into<String>) {
        let mut guard = self.inner.write().await;
        let entry = guard
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        entry.document_text = Some(text.into());
        entry.last_active = Instant::now();
    }

    /// Append a turn to the history and return the new history length.
    pub async fn append_turn(
        &self,
        session_id: &str,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> usize {
        let mut guard = self.inner.write().await;
        let entry = guard
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        entry.history.push(Turn {
            question: question.into(),
            answer: answer.into(),
        });
        entry.last_active = Instant::now();
        entry.history.len()
    }

    /// Copy of the session's history, oldest first. Unknown sessions have none.
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let guard = self.inner.read().await;
        guard
            .get(session_id)
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Drop the document and the history. Safe to call repeatedly.
    pub async fn reset(&self, session_id: &str) {
        let mut guard = self.inner.write().await;
        if let Some(session) = guard.get_mut(session_id) {
            session.document_text = None;
            session.history.clear();
            session.last_active = Instant::now();
        }
    }

    /// Remove sessions idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, s| now.duration_since(s.last_active) < self.ttl);
        before - guard.len()
    }

    /// Number of live and not-yet-purged sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basic_session_flow() {
        let store = SessionStore::new(Duration::from_secs(60));
        let sid = store.create_session().await;
        assert!(!sid.is_empty());
        let len = store.append_turn(&sid, "hello", "hi").await;
        assert_eq!(len, 1);
        assert_eq!(store.history(&sid).await.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_session_reads_as_empty() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.document_text("nope").await.is_none());
        assert!(store.history("nope").await.is_empty());
        store.reset("nope").await;
        assert_eq!(store.len().await, 0);
    }
}
