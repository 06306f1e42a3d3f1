//! Raw Jan Aushadhi product export.
//!
//! Only four columns matter: `Generic Name`, `Unit Size`, `MRP` and
//! `Group Name`. Other columns are ignored.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IngestError, IngestResult};

/// Column holding the product name with its composition.
pub const GENERIC_NAME_COLUMN: &str = "Generic Name";

/// One product as listed in the raw export.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawProductRow {
    #[serde(rename = "Generic Name")]
    pub generic_name: String,
    #[serde(rename = "Unit Size", default)]
    pub unit_size: String,
    /// Kept as text; see [`parse_mrp`]
    #[serde(rename = "MRP", default)]
    pub mrp: String,
    #[serde(rename = "Group Name", default)]
    pub group_name: String,
}

impl RawProductRow {
    pub fn new(generic_name: impl Into<String>) -> Self {
        Self {
            generic_name: generic_name.into(),
            unit_size: String::new(),
            mrp: String::new(),
            group_name: String::new(),
        }
    }
}

/// Parse an MRP cell such as "25", "₹ 1,250.50" or "Rs. 12".
///
/// Returns `None` for empty, negative or unparseable values.
pub fn parse_mrp(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('₹')
        .trim_start_matches("Rs.")
        .trim_start_matches("Rs")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Read every product from a raw export. Records that fail to deserialize
/// are logged and skipped.
pub fn read_raw_products(path: impl AsRef<Path>) -> IngestResult<Vec<RawProductRow>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let has_name_column = reader
        .headers()?
        .iter()
        .any(|header| header == GENERIC_NAME_COLUMN);
    if !has_name_column {
        return Err(IngestError::MissingColumn(GENERIC_NAME_COLUMN.into()));
    }

    let mut products = Vec::new();
    for (i, result) in reader.deserialize::<RawProductRow>().enumerate() {
        match result {
            Ok(row) => products.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => warn!(record = i + 1, error = %e, "Skipping malformed raw product"),
        }
    }

    debug!(path = %path.display(), products = products.len(), "Read raw export");
    Ok(products)
}
