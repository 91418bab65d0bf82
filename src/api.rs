//! HTTP API for MeliBuy
//!
//! A chat endpoint that drives the guided dialogue, plus thin read-only
//! catalog endpoints for integrations.

mod auth;
mod handlers;
mod types;

pub use auth::ApiKey;
pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::catalog::Catalog;
use crate::runtime::StateStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub sessions: Arc<dyn StateStore>,
    pub locks: SessionLocks,
    pub api_key: ApiKey,
}

impl AppState {
    pub fn new(catalog: Catalog, sessions: Arc<dyn StateStore>, api_key: ApiKey) -> Self {
        Self {
            catalog,
            sessions,
            locks: SessionLocks::default(),
            api_key,
        }
    }
}

type LockMap = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// One async mutex per session id, so turns of the same session run one at
/// a time while different sessions proceed in parallel.
#[derive(Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl SessionLocks {
    /// Wait for exclusive use of a session
    pub async fn lock(&self, session_id: &str) -> SessionGuard {
        // Exists before the wait: a cancelled waiter still prunes on drop.
        // Declared first so the pending acquire is dropped before it.
        let mut pending = SessionGuard {
            locks: self.clone(),
            session_id: session_id.to_string(),
            guard: None,
        };
        let entry = {
            let mut map = self.inner.lock().unwrap();
            map.entry(session_id.to_string()).or_default().clone()
        };
        pending.guard = Some(entry.lock_owned().await);
        pending
    }

    /// Number of sessions currently holding or waiting for a lock
    #[allow(dead_code)] // Used in tests
    pub fn active(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    fn prune(&self, session_id: &str) {
        let mut map = self.inner.lock().unwrap();
        // Only the map's own handle left: nobody holds or awaits it
        if map
            .get(session_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            map.remove(session_id);
        }
    }
}

/// Exclusive use of one session; released on drop
pub struct SessionGuard {
    locks: SessionLocks,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.prune(&self.session_id);
    }
}
