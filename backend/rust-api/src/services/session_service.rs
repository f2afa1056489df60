use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::metrics::SESSIONS_ACTIVE;
use crate::models::GameSession;

#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub game: GameSession,
    /// Set once the finished game has been written to the score file, so
    /// reloading the results page does not record it again.
    pub score_recorded: bool,
    expires_at: DateTime<Utc>,
}

/// Server-side game state keyed by the browser's session cookie.
///
/// Entries expire after `ttl` of inactivity; expired entries are dropped
/// lazily whenever the store is touched.
pub struct SessionService {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds.max(0)),
        }
    }

    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Stores a fresh game under `session_id`, replacing any previous one.
    pub async fn insert(&self, session_id: &str, game: GameSession) {
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        Self::purge_expired(&mut sessions, now);

        let entry = SessionEntry {
            game,
            score_recorded: false,
            expires_at: now + self.ttl,
        };

        if sessions.insert(session_id.to_string(), entry).is_none() {
            SESSIONS_ACTIVE.inc();
        }

        tracing::debug!("Session stored: {}", session_id);
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionEntry> {
        self.update(session_id, |entry| entry.clone()).await
    }

    /// Runs `f` against the live entry and refreshes its expiry.
    /// Returns `None` when there is no (unexpired) session for the id.
    pub async fn update<F, T>(&self, session_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut SessionEntry) -> T,
    {
        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        Self::purge_expired(&mut sessions, now);

        let entry = sessions.get_mut(session_id)?;
        entry.expires_at = now + self.ttl;
        Some(f(entry))
    }

    pub async fn remove(&self, session_id: &str) -> Option<SessionEntry> {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove(session_id);
        if removed.is_some() {
            SESSIONS_ACTIVE.dec();
            tracing::debug!("Session removed: {}", session_id);
        }
        removed
    }

    pub async fn active_count(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        Self::purge_expired(&mut sessions, Utc::now());
        sessions.len()
    }

    fn purge_expired(sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        let purged = before - sessions.len();

        if purged > 0 {
            SESSIONS_ACTIVE.sub(purged as i64);
            tracing::info!("Expired {} idle game sessions", purged);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::riddle::catalog;

    #[tokio::test]
    async fn test_insert_get_and_remove() {
        let service = SessionService::new(3600);
        let id = SessionService::new_session_id();

        assert!(service.get(&id).await.is_none());

        service.insert(&id, GameSession::start("Ava", &catalog())).await;
        let entry = service.get(&id).await.unwrap();
        assert_eq!(entry.game.player_name(), "Ava");
        assert!(!entry.score_recorded);
        assert_eq!(service.active_count().await, 1);

        assert!(service.remove(&id).await.is_some());
        assert!(service.get(&id).await.is_none());
        assert!(service.remove(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_update_mutates_stored_game() {
        let service = SessionService::new(3600);
        let id = SessionService::new_session_id();
        service.insert(&id, GameSession::start("Ava", &catalog())).await;

        let outcome = service
            .update(&id, |entry| entry.game.submit_answer("definitely wrong"))
            .await
            .unwrap()
            .unwrap();
        assert!(!outcome.correct);

        let entry = service.get(&id).await.unwrap();
        assert_eq!(entry.game.attempts_on_current(), 1);
    }

    #[tokio::test]
    async fn test_insert_replaces_existing_game() {
        let service = SessionService::new(3600);
        let id = SessionService::new_session_id();
        service.insert(&id, GameSession::start("Ava", &catalog())).await;
        service
            .update(&id, |entry| entry.score_recorded = true)
            .await
            .unwrap();

        service.insert(&id, GameSession::start("Ava", &catalog())).await;

        let entry = service.get(&id).await.unwrap();
        assert!(!entry.score_recorded);
        assert_eq!(service.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let service = SessionService::new(0);
        let id = SessionService::new_session_id();
        service.insert(&id, GameSession::start("Ava", &catalog())).await;

        assert!(service.get(&id).await.is_none());
        assert_eq!(service.active_count().await, 0);
    }
}
