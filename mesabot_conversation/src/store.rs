//! Process-lifetime session storage.

use async_trait::async_trait;
use chrono::Utc;
use mesabot_core::{Session, SessionStore};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// `SessionStore` backed by a `HashMap` behind an async lock.
///
/// Sessions live until completed, explicitly deleted or evicted as idle.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, sender_id: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.sessions.read().await.get(sender_id).cloned())
    }

    async fn put(&self, sender_id: &str, session: Session) -> anyhow::Result<()> {
        self.sessions
            .write()
            .await
            .insert(sender_id.to_string(), session);
        Ok(())
    }

    async fn delete(&self, sender_id: &str) -> anyhow::Result<()> {
        self.sessions.write().await.remove(sender_id);
        Ok(())
    }

    async fn evict_idle(&self, idle_for: Duration) -> anyhow::Result<usize> {
        let Some(cutoff) = chrono::Duration::from_std(idle_for)
            .ok()
            .and_then(|idle_for| Utc::now().checked_sub_signed(idle_for))
        else {
            // Cutoff predates any representable time: nothing can be that idle.
            return Ok(0);
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|sender_id, session| {
            let keep = session.updated_at() > cutoff;
            if !keep {
                debug!("Evicting idle session for {sender_id} at stage {}", session.stage());
            }
            keep
        });

        Ok(before - sessions.len())
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(self.sessions.read().await.len())
    }
}
