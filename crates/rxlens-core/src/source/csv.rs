//! Refined CSV tables.
//!
//! Layout of a refined directory:
//! - `drugs.csv`: drug_id, drug_name (optional)
//! - `jan_aushadhi_medicines.csv`: medicine_id, medicine_name, unit_size, mrp, group_name, category
//! - `jan_aushadhi_composition.csv`: medicine_id, drug_id, amount, unit

use std::fs;
use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{CatalogSource, SourceError, SourceResult};
use crate::models::{CompositionRow, IngredientRow, MedicineRow};

pub const INGREDIENTS_FILE: &str = "drugs.csv";
pub const MEDICINES_FILE: &str = "jan_aushadhi_medicines.csv";
pub const COMPOSITION_FILE: &str = "jan_aushadhi_composition.csv";

/// Catalog rows read from refined CSV files.
#[derive(Debug, Clone)]
pub struct CsvSource {
    ingredients: Option<PathBuf>,
    medicines: PathBuf,
    compositions: PathBuf,
}

impl CsvSource {
    /// Medicine and composition files only.
    pub fn new(medicines: impl Into<PathBuf>, compositions: impl Into<PathBuf>) -> Self {
        Self {
            ingredients: None,
            medicines: medicines.into(),
            compositions: compositions.into(),
        }
    }

    /// The standard file names inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(MEDICINES_FILE), dir.join(COMPOSITION_FILE))
            .with_ingredients(dir.join(INGREDIENTS_FILE))
    }

    pub fn with_ingredients(mut self, path: impl Into<PathBuf>) -> Self {
        self.ingredients = Some(path.into());
        self
    }

    /// Write the three tables into `dir` under the standard names.
    pub fn write_tables(
        dir: impl AsRef<Path>,
        ingredients: &[IngredientRow],
        medicines: &[MedicineRow],
        compositions: &[CompositionRow],
    ) -> SourceResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        write_records(&dir.join(INGREDIENTS_FILE), ingredients)?;
        write_records(&dir.join(MEDICINES_FILE), medicines)?;
        write_records(&dir.join(COMPOSITION_FILE), compositions)?;
        Ok(Self::from_dir(dir))
    }
}

impl CatalogSource for CsvSource {
    fn ingredient_rows(&self) -> SourceResult<Vec<IngredientRow>> {
        match &self.ingredients {
            Some(path) if path.exists() => read_records(path),
            Some(path) => {
                debug!(path = %path.display(), "No ingredient file, names unavailable");
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    fn medicine_rows(&self) -> SourceResult<Vec<MedicineRow>> {
        read_records(&self.medicines)
    }

    fn composition_rows(&self) -> SourceResult<Vec<CompositionRow>> {
        read_records(&self.compositions)
    }
}

/// Read every record that deserializes; malformed ones are logged and skipped.
fn read_records<T: DeserializeOwned>(path: &Path) -> SourceResult<Vec<T>> {
    if !path.exists() {
        return Err(SourceError::MissingFile(path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    record = i + 1,
                    error = %e,
                    "Skipping malformed CSV record"
                );
                skipped += 1;
            }
        }
    }

    debug!(path = %path.display(), records = records.len(), skipped, "Read CSV table");
    Ok(records)
}

fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> SourceResult<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
