//! SQLite schema definition.

/// Refined catalog tables, mirroring the refined CSV files.
pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Ingredients
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    drug_id INTEGER PRIMARY KEY,
    drug_name TEXT NOT NULL
);

-- ============================================================================
-- Medicines
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    medicine_id INTEGER PRIMARY KEY,
    medicine_name TEXT NOT NULL,
    unit_size TEXT NOT NULL DEFAULT '',
    mrp REAL NOT NULL DEFAULT 0,
    group_name TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT 'unknown',
    loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medicines_name ON medicines(medicine_name);

-- ============================================================================
-- Composition (raw amount/unit text, normalized at catalog build)
-- ============================================================================

CREATE TABLE IF NOT EXISTS composition (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medicine_id INTEGER NOT NULL REFERENCES medicines(medicine_id) ON DELETE CASCADE,
    drug_id INTEGER NOT NULL,
    amount TEXT NOT NULL,
    unit TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_composition_medicine ON composition(medicine_id);
CREATE INDEX IF NOT EXISTS idx_composition_drug ON composition(drug_id);
"#;
