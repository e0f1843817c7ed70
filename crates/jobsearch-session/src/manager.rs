//! SessionManager: concurrent per-session access via DashMap.
//!
//! Map guards are held only for short state copies and swaps, never across a
//! search. Every mutation bumps the session's revision; a turn computed from a
//! snapshot commits only if the revision it read is still current.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jobsearch_core::config::SessionConfig;
use tracing::debug;
use uuid::Uuid;

use crate::state::SessionState;

/// A session plus its lifecycle timestamps.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Number of committed mutations.
    pub revision: u64,
}

impl SessionHandle {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            state: SessionState::new(),
            created_at: now,
            last_accessed: now,
            revision: 0,
        }
    }

    fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    fn mutate<R>(&mut self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        self.touch();
        self.revision += 1;
        f(&mut self.state)
    }
}

/// Thread-safe session map. Clones share the same sessions.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionHandle>>,
    ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_config(&SessionConfig::default())
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager whose default idle timeout is `config.ttl_secs`.
    pub fn with_config(config: &SessionConfig) -> Self {
        let ttl = i64::try_from(config.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session under a fresh random id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), SessionHandle::new());
        debug!(session_id = %id, "session created");
        id
    }

    /// Ensure `session_id` exists. Returns true when it was just created.
    pub fn get_or_create(&self, session_id: &str) -> bool {
        let mut created = false;
        self.sessions.entry(session_id.to_string()).or_insert_with(|| {
            created = true;
            SessionHandle::new()
        });
        created
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Run `f` with exclusive access to an existing session. The map guard is
    /// held while `f` runs, so keep it short.
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        self.sessions
            .get_mut(session_id)
            .map(|mut handle| handle.mutate(f))
    }

    /// Like `with_session`, creating the session first if needed.
    pub fn with_session_or_create<R>(&self, session_id: &str, f: impl FnOnce(&mut SessionState) -> R) -> R {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionHandle::new)
            .mutate(f)
    }

    /// Cloned snapshot of a session's state.
    pub fn snapshot(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.get(session_id).map(|h| h.state.clone())
    }

    /// Snapshot plus the revision it was taken at. An absent session reads as
    /// an empty state at revision 0.
    pub fn snapshot_with_revision(&self, session_id: &str) -> (SessionState, u64) {
        self.sessions
            .get(session_id)
            .map(|h| (h.state.clone(), h.revision))
            .unwrap_or_default()
    }

    /// Replace the state if the session is still at `revision`. Returns false
    /// when another mutation landed first; the caller should recompute.
    pub fn commit(&self, session_id: &str, revision: u64, next: SessionState) -> bool {
        match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let handle = entry.get_mut();
                if handle.revision != revision {
                    return false;
                }
                handle.mutate(|state| *state = next);
                true
            }
            Entry::Vacant(entry) => {
                if revision != 0 {
                    return false;
                }
                let mut handle = SessionHandle::new();
                handle.mutate(|state| *state = next);
                entry.insert(handle);
                true
            }
        }
    }

    /// Reset a session to empty, keeping it registered.
    pub fn clear(&self, session_id: &str) -> bool {
        self.with_session(session_id, SessionState::clear).is_some()
    }

    pub fn remove(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.remove(session_id).map(|(_, h)| h)
    }

    /// Drop sessions idle for longer than the configured TTL.
    pub fn cleanup_expired_default(&self) -> usize {
        self.cleanup_expired(self.ttl)
    }

    /// Drop sessions idle for longer than `ttl`. Returns how many were removed.
    pub fn cleanup_expired(&self, ttl: Duration) -> usize {
        self.cleanup_expired_at(Utc::now(), ttl)
    }

    /// `cleanup_expired` against an explicit clock.
    pub fn cleanup_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, h| {
            let keep = now - h.last_accessed <= ttl;
            removed += usize::from(!keep);
            keep
        });
        if removed > 0 {
            debug!(removed, remaining = self.sessions.len(), "expired sessions removed");
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }
}
