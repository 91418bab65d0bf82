//! Catalog store for MeliBuy
//!
//! Read-only access to categories, materials, suppliers and prices kept in
//! SQLite. A connection is opened per conversational turn and closed when the
//! [`CatalogConnection`] is dropped.

mod schema;

pub use schema::*;

use crate::runtime::CatalogStore;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Location of the catalog database. Holds no open handle.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the catalog tables if they are missing and return the catalog
    #[allow(dead_code)] // Used in tests
    pub fn create(path: impl Into<PathBuf>) -> CatalogResult<Self> {
        let catalog = Self::new(path);
        let conn = Connection::open(&catalog.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(catalog)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a read-only connection scoped to one turn. A missing file is an
    /// error, never an empty catalog.
    pub fn connect(&self) -> CatalogResult<CatalogConnection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)?;
        register_functions(&conn)?;
        tracing::debug!(path = %self.path.display(), "Catalog connection opened");
        Ok(CatalogConnection { conn })
    }
}

/// SQLite's `LOWER()` only folds ASCII; "ELÉTRICOS" must match "elétricos".
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
}

/// Open catalog handle. Closes on drop, so every exit path of a turn releases it.
pub struct CatalogConnection {
    conn: Connection,
}

impl Drop for CatalogConnection {
    fn drop(&mut self) {
        tracing::debug!("Catalog connection closed");
    }
}

impl CatalogStore for CatalogConnection {
    fn list_categories(&self) -> CatalogResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT category FROM materials
             GROUP BY category
             ORDER BY MIN(id)",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CatalogError::from)
    }

    fn list_materials(&self, category: &str) -> CatalogResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM materials
             WHERE unicode_lower(category) = unicode_lower(?1)
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![category], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CatalogError::from)
    }

    fn query_suppliers(&self, material: &str, region: &str) -> CatalogResult<Vec<SupplierQuote>> {
        let mut stmt = self.conn.prepare(QUERY_SUPPLIERS)?;
        #[allow(clippy::cast_possible_wrap)] // MAX_QUOTES is tiny
        let limit = MAX_QUOTES as i64;
        let rows = stmt.query_map(params![material, region, limit], |row| {
            Ok(SupplierQuote {
                supplier: text_column(row, 0)?,
                region: text_column(row, 1)?,
                supplier_code: text_column(row, 2)?,
                material: text_column(row, 3)?,
                material_code: text_column(row, 4)?,
                price: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CatalogError::from)
    }

    fn list_distinct_regions(&self) -> CatalogResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT region FROM suppliers WHERE region IS NOT NULL")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(CatalogError::from)
    }
}

/// Codes are loaded from spreadsheets and may land as integers.
fn text_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

#[cfg(test)]
impl Catalog {
    /// Writable connection for loading fixtures
    pub fn seed(&self) -> CatalogConnection {
        CatalogConnection {
            conn: Connection::open(&self.path).unwrap(),
        }
    }
}

#[cfg(test)]
impl CatalogConnection {
    pub fn add_material(&self, name: &str, code: &str, category: &str) -> i64 {
        self.conn
            .execute(
                "INSERT INTO materials (name, code, category) VALUES (?1, ?2, ?3)",
                params![name, code, category],
            )
            .unwrap();
        self.conn.last_insert_rowid()
    }

    pub fn add_supplier(&self, name: &str, code: &str, region: &str) -> i64 {
        self.conn
            .execute(
                "INSERT INTO suppliers (name, code, region) VALUES (?1, ?2, ?3)",
                params![name, code, region],
            )
            .unwrap();
        self.conn.last_insert_rowid()
    }

    pub fn add_price(&self, supplier_id: i64, material_id: i64, value: f64) {
        self.conn
            .execute(
                "INSERT INTO prices (supplier_id, material_id, value) VALUES (?1, ?2, ?3)",
                params![supplier_id, material_id, value],
            )
            .unwrap();
    }
}
