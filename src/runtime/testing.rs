//! Mock implementations for testing
//!
//! These mocks enable dialogue and transport tests without a real catalog
//! database.

use super::traits::*;
use crate::catalog::{CatalogError, CatalogResult, SupplierQuote, MAX_QUOTES};
use crate::dialogue::StateSnapshot;
use async_trait::async_trait;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Mutex;

// ============================================================================
// Mock Catalog
// ============================================================================

#[derive(Debug, Clone)]
struct MockRow {
    name: String,
    code: String,
    /// Category for materials, region for suppliers
    group: String,
}

/// In-memory catalog with the same matching and ordering rules as SQLite
#[derive(Debug, Default)]
pub struct MockCatalog {
    materials: Vec<MockRow>,
    suppliers: Vec<MockRow>,
    /// (supplier name, material name, price)
    prices: Vec<(String, String, f64)>,
    category_reads: Cell<usize>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(mut self, name: &str, code: &str, category: &str) -> Self {
        self.materials.push(MockRow {
            name: name.to_string(),
            code: code.to_string(),
            group: category.to_string(),
        });
        self
    }

    pub fn with_supplier(mut self, name: &str, code: &str, region: &str) -> Self {
        self.suppliers.push(MockRow {
            name: name.to_string(),
            code: code.to_string(),
            group: region.to_string(),
        });
        self
    }

    pub fn with_price(mut self, supplier: &str, material: &str, price: f64) -> Self {
        self.prices
            .push((supplier.to_string(), material.to_string(), price));
        self
    }

    /// Number of `list_categories` calls served
    pub fn category_reads(&self) -> usize {
        self.category_reads.get()
    }
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl CatalogStore for MockCatalog {
    fn list_categories(&self) -> CatalogResult<Vec<String>> {
        self.category_reads.set(self.category_reads.get() + 1);
        let mut categories: Vec<String> = Vec::new();
        for material in &self.materials {
            if !categories.contains(&material.group) {
                categories.push(material.group.clone());
            }
        }
        Ok(categories)
    }

    fn list_materials(&self, category: &str) -> CatalogResult<Vec<String>> {
        Ok(self
            .materials
            .iter()
            .filter(|m| same(&m.group, category))
            .map(|m| m.name.clone())
            .collect())
    }

    fn query_suppliers(&self, material: &str, region: &str) -> CatalogResult<Vec<SupplierQuote>> {
        let mut quotes: Vec<SupplierQuote> = self
            .prices
            .iter()
            .filter_map(|(supplier_name, material_name, price)| {
                let supplier = self.suppliers.iter().find(|s| s.name == *supplier_name)?;
                let item = self.materials.iter().find(|m| m.name == *material_name)?;
                (same(&item.name, material) && same(&supplier.group, region)).then(|| {
                    SupplierQuote {
                        supplier: supplier.name.clone(),
                        region: supplier.group.clone(),
                        supplier_code: supplier.code.clone(),
                        material: item.name.clone(),
                        material_code: item.code.clone(),
                        price: *price,
                    }
                })
            })
            .collect();

        // Stable sort keeps insertion order between equal prices
        quotes.sort_by(|a, b| a.price.total_cmp(&b.price));
        quotes.truncate(MAX_QUOTES);
        Ok(quotes)
    }

    fn list_distinct_regions(&self) -> CatalogResult<Vec<String>> {
        let mut regions: Vec<String> = Vec::new();
        for supplier in &self.suppliers {
            if !regions.contains(&supplier.group) {
                regions.push(supplier.group.clone());
            }
        }
        Ok(regions)
    }
}

/// Catalog whose every query fails, as when the database file is unreadable
pub struct FailingCatalog;

fn unavailable() -> CatalogError {
    CatalogError::Sqlite(rusqlite::Error::InvalidPath("catalog unavailable".into()))
}

impl CatalogStore for FailingCatalog {
    fn list_categories(&self) -> CatalogResult<Vec<String>> {
        Err(unavailable())
    }

    fn list_materials(&self, _category: &str) -> CatalogResult<Vec<String>> {
        Err(unavailable())
    }

    fn query_suppliers(&self, _material: &str, _region: &str) -> CatalogResult<Vec<SupplierQuote>> {
        Err(unavailable())
    }

    fn list_distinct_regions(&self) -> CatalogResult<Vec<String>> {
        Err(unavailable())
    }
}

// ============================================================================
// Mock State Store
// ============================================================================

/// In-memory session state storage
#[derive(Default)]
pub struct InMemoryStateStore {
    states: Mutex<HashMap<String, StateSnapshot>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<StateSnapshot> {
        self.states.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load_state(&self, session_id: &str) -> Result<Option<StateSnapshot>, String> {
        Ok(self.get(session_id))
    }

    async fn save_state(&self, session_id: &str, state: &StateSnapshot) -> Result<(), String> {
        self.states
            .lock()
            .unwrap()
            .insert(session_id.to_string(), state.clone());
        Ok(())
    }

    async fn delete_state(&self, session_id: &str) -> Result<bool, String> {
        Ok(self.states.lock().unwrap().remove(session_id).is_some())
    }
}

/// State store that is always down
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn load_state(&self, _session_id: &str) -> Result<Option<StateSnapshot>, String> {
        Err("session store unavailable".to_string())
    }

    async fn save_state(&self, _session_id: &str, _state: &StateSnapshot) -> Result<(), String> {
        Err("session store unavailable".to_string())
    }

    async fn delete_state(&self, _session_id: &str) -> Result<bool, String> {
        Err("session store unavailable".to_string())
    }
}
