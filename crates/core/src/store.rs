//! Session repository.
//!
//! Sessions live behind an explicit store trait instead of ambient global
//! state, so the in-memory map can be swapped for an external store
//! without touching the session manager. Each stored session carries its
//! own `Mutex`: locking the session is how turn processing is serialized.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::InterviewSession;

pub type SessionHandle = Arc<Mutex<InterviewSession>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &Uuid) -> Option<SessionHandle>;
    async fn put(&self, session: InterviewSession) -> SessionHandle;
    async fn delete(&self, session_id: &Uuid);
}

/// Process-lifetime store; sessions do not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn put(&self, session: InterviewSession) -> SessionHandle {
        let session_id = session.session_id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .await
            .insert(session_id, handle.clone());
        handle
    }

    async fn delete(&self, session_id: &Uuid) {
        self.sessions.write().await.remove(session_id);
    }
}
