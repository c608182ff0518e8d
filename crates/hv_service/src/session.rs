//! Session manager: session id → capability with sliding expiry.
//!
//! One process-wide table maps opaque session ids to unwrapped key
//! capabilities so clients do not pay the KDF on every request. A single
//! mutex guards the whole table. `get` refreshes the entry's last-access
//! stamp, so even a lookup is a write; a shared/exclusive lock split would
//! race on that stamp and must not be introduced here.
//!
//! Expired entries are evicted by the `get` that discovers them. That
//! eviction is the side effect of returning [`SessionError::Expired`]; a
//! later `get` of the same id reports [`SessionError::NotFound`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;
use tracing::debug;

/// Default sliding-window lifetime of a session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session expired")]
    Expired,
}

struct Entry<C> {
    capability: C,
    last_access: Instant,
}

/// Process-wide session table. Share via reference or `Arc`.
pub struct SessionManager<C> {
    sessions: Mutex<HashMap<String, Entry<C>>>,
    ttl: Duration,
}

impl<C: Clone> SessionManager<C> {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    /// Build a manager with a custom time-to-live (tests, short-lived
    /// deployments).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Store a capability and return the fresh opaque id that retrieves it.
    pub fn add(&self, capability: C) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock();
        sessions.insert(
            id.clone(),
            Entry {
                capability,
                last_access: Instant::now(),
            },
        );
        id
    }

    /// Resolve a session id to its capability.
    ///
    /// A hit refreshes the sliding window and returns a clone of the
    /// capability. An entry past the TTL is removed and reported as
    /// `Expired`.
    pub fn get(&self, id: &str) -> Result<C, SessionError> {
        let mut sessions = self.sessions.lock();

        let entry = sessions.get_mut(id).ok_or(SessionError::NotFound)?;

        if entry.last_access.elapsed() > self.ttl {
            sessions.remove(id);
            debug!("evicted expired session");
            return Err(SessionError::Expired);
        }

        entry.last_access = Instant::now();
        Ok(entry.capability.clone())
    }

    /// Explicit invalidation (logout). Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        self.sessions.lock().remove(id);
    }
}

impl<C: Clone> Default for SessionManager<C> {
    fn default() -> Self {
        Self::new()
    }
}
