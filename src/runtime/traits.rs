//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the dialogue and the transport with mock
//! implementations.

use crate::catalog::{CatalogResult, SupplierQuote};
use crate::db::Database;
use crate::dialogue::StateSnapshot;
use async_trait::async_trait;

/// Read-only catalog queries used by a conversational turn
pub trait CatalogStore {
    /// Distinct category names, in catalog order
    fn list_categories(&self) -> CatalogResult<Vec<String>>;

    /// Material names of one category (case-insensitive match)
    fn list_materials(&self, category: &str) -> CatalogResult<Vec<String>>;

    /// Up to three cheapest quotes for a material in a region, ascending by price
    fn query_suppliers(&self, material: &str, region: &str) -> CatalogResult<Vec<SupplierQuote>>;

    /// Every region name suppliers are registered under
    fn list_distinct_regions(&self) -> CatalogResult<Vec<String>>;
}

/// Storage for per-session conversation state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the stored snapshot, `None` for an unknown session
    async fn load_state(&self, session_id: &str) -> Result<Option<StateSnapshot>, String>;

    /// Store the snapshot, replacing any previous one
    async fn save_state(&self, session_id: &str, state: &StateSnapshot) -> Result<(), String>;

    /// Drop the session; `false` if it was unknown
    async fn delete_state(&self, session_id: &str) -> Result<bool, String>;
}

// ============================================================================
// Production adapters
// ============================================================================

/// Adapter to use Database as StateStore
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StateStore for DatabaseStorage {
    async fn load_state(&self, session_id: &str) -> Result<Option<StateSnapshot>, String> {
        self.db.load_state(session_id).map_err(|e| e.to_string())
    }

    async fn save_state(&self, session_id: &str, state: &StateSnapshot) -> Result<(), String> {
        self.db
            .save_state(session_id, state)
            .map_err(|e| e.to_string())
    }

    async fn delete_state(&self, session_id: &str) -> Result<bool, String> {
        self.db
            .delete_session(session_id)
            .map_err(|e| e.to_string())
    }
}
