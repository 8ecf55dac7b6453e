//! Active Tutor Session Registry.
//!
//! Each session sits behind its own mutex, so two requests for the same
//! session run one after the other while different sessions never wait on
//! each other. Sessions idle for longer than the TTL are dropped, key and
//! history included.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use mathmentor_core::ApiKey;
use mathmentor_session::Session;

pub type SharedSession = Arc<Mutex<Session>>;

/// Idle time after which a session is dropped when no TTL is configured.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3_600);

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

impl Entry {
    /// A session some request still holds is never expired under it.
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        Arc::strong_count(&self.session) == 1 && now.duration_since(self.last_seen) > ttl
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a new session holding `api_key` and return its id.
    pub async fn create(&self, api_key: ApiKey) -> Uuid {
        let session = Session::with_credential(api_key);
        let id = session.id();
        let mut w = self.sessions.write().await;
        w.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Look up a live session and mark it as seen. An expired session is
    /// dropped on the spot.
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut w = self.sessions.write().await;
        if w.get(id)?.is_expired(self.ttl, now) {
            w.remove(id);
            debug!(session_id = %id, "Dropped expired session on access");
            return None;
        }
        let entry = w.get_mut(id)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    /// Drop a session and everything it holds. Returns whether it existed.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let mut w = self.sessions.write().await;
        w.remove(id).is_some()
    }

    /// Drop every expired session and return how many went.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut w = self.sessions.write().await;
        let before = w.len();
        w.retain(|_, entry| !entry.is_expired(self.ttl, now));
        before - w.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let id = registry.create(ApiKey::new("gsk_reg").unwrap()).await;

        let session = registry.get(&id).await.unwrap();
        assert_eq!(session.lock().await.id(), id);
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let a = registry.create(ApiKey::new("gsk_a").unwrap()).await;
        let b = registry.create(ApiKey::new("gsk_b").unwrap()).await;

        {
            let session = registry.get(&a).await.unwrap();
            session.lock().await.state.solution = Some("x = 2".into());
        }

        let other = registry.get(&b).await.unwrap();
        assert!(other.lock().await.state.solution.is_none());
    }

    #[tokio::test]
    async fn test_idle_sessions_are_swept() {
        let registry = SessionRegistry::with_ttl(Duration::from_millis(20));
        let idle = registry.create(ApiKey::new("gsk_idle").unwrap()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = registry.create(ApiKey::new("gsk_fresh").unwrap()).await;

        assert_eq!(registry.sweep_expired().await, 1);
        assert!(registry.get(&idle).await.is_none());
        assert!(registry.get(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_session_is_gone_on_access() {
        let registry = SessionRegistry::with_ttl(Duration::from_millis(20));
        let id = registry.create(ApiKey::new("gsk_old").unwrap()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(registry.get(&id).await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_session_in_use_is_kept() {
        let registry = SessionRegistry::with_ttl(Duration::from_millis(20));
        let id = registry.create(ApiKey::new("gsk_busy").unwrap()).await;
        let held = registry.get(&id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(registry.sweep_expired().await, 0);
        drop(held);
        assert_eq!(registry.sweep_expired().await, 1);
    }
}
