//! Catalog schema and row types

use serde::Serialize;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS materials (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    category TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_materials_category ON materials(category);

CREATE TABLE IF NOT EXISTS suppliers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    region TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_suppliers_region ON suppliers(region);

CREATE TABLE IF NOT EXISTS prices (
    id INTEGER PRIMARY KEY,
    supplier_id INTEGER NOT NULL,
    material_id INTEGER NOT NULL,
    value REAL NOT NULL,

    FOREIGN KEY (supplier_id) REFERENCES suppliers(id) ON DELETE CASCADE,
    FOREIGN KEY (material_id) REFERENCES materials(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_prices_material ON prices(material_id, value);
";

/// Cheapest-supplier lookup, ascending by price. `prices.id` keeps ties in
/// insertion order.
pub(crate) const QUERY_SUPPLIERS: &str = "
SELECT s.name, s.region, s.code, m.name, m.code, p.value
FROM prices p
JOIN suppliers s ON s.id = p.supplier_id
JOIN materials m ON m.id = p.material_id
WHERE unicode_lower(m.name) = unicode_lower(?1)
  AND unicode_lower(s.region) = unicode_lower(?2)
ORDER BY p.value ASC, p.id ASC
LIMIT ?3
";

/// Maximum number of quotes returned by a supplier query
pub const MAX_QUOTES: usize = 3;

/// One priced supplier row for a material in a region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierQuote {
    pub supplier: String,
    pub region: String,
    pub supplier_code: String,
    pub material: String,
    pub material_code: String,
    pub price: f64,
}
