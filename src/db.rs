//! Session store for MeliBuy
//!
//! Persists the conversation state snapshot of every chat session.

mod schema;

pub use schema::*;

use crate::dialogue::StateSnapshot;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("State encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Stored state of a session, `None` if the session is unknown.
    ///
    /// A state that no longer parses is logged and replaced by a fresh one.
    pub fn load_state(&self, id: &str) -> DbResult<Option<StateSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT state FROM sessions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|json| parse_state(id, &json)))
    }

    /// Store the state of a session, creating the session if needed
    pub fn save_state(&self, id: &str, state: &StateSnapshot) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO sessions (id, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at",
            params![id, json, now],
        )?;
        Ok(())
    }

    /// Forget a session. Returns whether it existed.
    pub fn delete_session(&self, id: &str) -> DbResult<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

fn parse_state(id: &str, json: &str) -> StateSnapshot {
    serde_json::from_str(json).unwrap_or_else(|e| {
        tracing::warn!(session_id = %id, error = %e, "Unreadable session state, starting fresh");
        StateSnapshot::default()
    })
}
