//! In-process chat session storage.
//!
//! The map lock is only held to look up or insert an entry. Each session has
//! its own lock, which a turn holds until its history update is done, so two
//! turns on the same session never interleave while different sessions run
//! concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::models::{ConversationMessage, Session};

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `id`, created empty on first use.
    pub async fn get_or_create(&self, id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!(session_id = id, "created session");
                Arc::new(Mutex::new(Session::new(id)))
            })
            .clone()
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Copy of the history of `id`, if the session exists.
    pub async fn history(&self, id: &str) -> Option<Vec<ConversationMessage>> {
        let handle = self.get(id).await?;
        let session = handle.lock().await;
        Some(session.history.clone())
    }

    /// Reset the history of `id`, keeping the session. Returns false when
    /// the session does not exist.
    pub async fn clear(&self, id: &str) -> bool {
        let Some(handle) = self.get(id).await else {
            return false;
        };
        handle.lock().await.clear();
        info!(session_id = id, "Cleared session");
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
