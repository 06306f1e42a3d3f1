//! Raw export → refined catalog tables.

use std::path::Path;

use tracing::{info, warn};

use rxlens_core::catalog::{Catalog, CatalogBuilder, InvertedIndex};
use rxlens_core::db::{Database, ImportCounts};
use rxlens_core::dosage::DosageParser;
use rxlens_core::models::{Category, CompositionRow, IngredientRow, MedicineId, MedicineRow};
use rxlens_core::source::{CatalogSource, CsvSource, SourceResult};

use crate::error::IngestResult;
use crate::raw::{parse_mrp, RawProductRow};
use crate::registry::DrugRegistry;

/// Counters collected while ingesting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub products: usize,
    /// Products whose name yielded no `amount unit` pair
    pub without_composition: usize,
    pub composition_rows: usize,
    /// MRP cells that could not be read and were stored as 0
    pub unpriced: usize,
    pub skipped_blank: usize,
}

/// Turns raw products into the refined ingredient, medicine and
/// composition tables.
pub struct Ingestor {
    parser: DosageParser,
    registry: DrugRegistry,
    medicines: Vec<MedicineRow>,
    compositions: Vec<CompositionRow>,
    next_medicine_id: MedicineId,
    stats: IngestStats,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Ingestor {
    pub fn new() -> Self {
        Self::with_parser(DosageParser::new())
    }

    pub fn with_parser(parser: DosageParser) -> Self {
        Self {
            parser,
            registry: DrugRegistry::new(),
            medicines: Vec::new(),
            compositions: Vec::new(),
            next_medicine_id: 1,
            stats: IngestStats::default(),
        }
    }

    /// Ingest one product. Returns the assigned medicine id, or `None` for
    /// a blank name.
    pub fn ingest_row(&mut self, raw: &RawProductRow) -> Option<MedicineId> {
        let name = raw.generic_name.trim();
        if name.is_empty() {
            self.stats.skipped_blank += 1;
            return None;
        }

        let medicine_id = self.next_medicine_id;
        self.next_medicine_id += 1;
        self.stats.products += 1;

        let price = match parse_mrp(&raw.mrp) {
            Some(price) => price,
            None => {
                if !raw.mrp.trim().is_empty() {
                    warn!(medicine_id, mrp = %raw.mrp, "Unreadable MRP, storing 0");
                }
                self.stats.unpriced += 1;
                0.0
            }
        };

        self.medicines.push(MedicineRow {
            medicine_id,
            name: name.to_string(),
            unit_size: raw.unit_size.trim().to_string(),
            price,
            group_name: raw.group_name.trim().to_string(),
            category: Category::from_text(name).as_str().to_string(),
        });

        let parsed = self.parser.parse(name);
        if parsed.is_empty() {
            self.stats.without_composition += 1;
        }
        for dosage in parsed {
            let drug_id = self.registry.register(&dosage.ingredient);
            self.compositions.push(CompositionRow::new(
                medicine_id,
                drug_id,
                dosage.amount,
                dosage.unit,
            ));
            self.stats.composition_rows += 1;
        }

        Some(medicine_id)
    }

    pub fn ingest_all<'a>(&mut self, rows: impl IntoIterator<Item = &'a RawProductRow>) {
        for row in rows {
            self.ingest_row(row);
        }
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn finish(self) -> RefinedCatalog {
        info!(
            products = self.stats.products,
            ingredients = self.registry.len(),
            composition_rows = self.stats.composition_rows,
            without_composition = self.stats.without_composition,
            unpriced = self.stats.unpriced,
            "Ingestion complete"
        );
        RefinedCatalog {
            ingredients: self.registry.into_rows(),
            medicines: self.medicines,
            compositions: self.compositions,
            stats: self.stats,
        }
    }
}

/// Refined tables ready to be written out or loaded.
#[derive(Debug, Clone, Default)]
pub struct RefinedCatalog {
    pub ingredients: Vec<IngredientRow>,
    pub medicines: Vec<MedicineRow>,
    pub compositions: Vec<CompositionRow>,
    pub stats: IngestStats,
}

impl RefinedCatalog {
    /// Write the three refined CSV files into `dir`.
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> IngestResult<CsvSource> {
        let source = CsvSource::write_tables(
            dir,
            &self.ingredients,
            &self.medicines,
            &self.compositions,
        )?;
        Ok(source)
    }

    /// Replace the catalog tables of `db` with these rows.
    pub fn write_to_database(&self, db: &mut Database) -> IngestResult<ImportCounts> {
        let counts = db.replace_catalog(&self.ingredients, &self.medicines, &self.compositions)?;
        Ok(counts)
    }

    /// Build the in-memory catalog directly.
    pub fn build(&self) -> (Catalog, InvertedIndex) {
        CatalogBuilder::new()
            .ingredients(self.ingredients.iter().cloned())
            .medicines(self.medicines.iter().cloned())
            .compositions(self.compositions.iter().cloned())
            .build()
    }
}

impl CatalogSource for RefinedCatalog {
    fn ingredient_rows(&self) -> SourceResult<Vec<IngredientRow>> {
        Ok(self.ingredients.clone())
    }

    fn medicine_rows(&self) -> SourceResult<Vec<MedicineRow>> {
        Ok(self.medicines.clone())
    }

    fn composition_rows(&self) -> SourceResult<Vec<CompositionRow>> {
        Ok(self.compositions.clone())
    }
}

/// Ingest every product in `rows`.
pub fn refine(rows: &[RawProductRow]) -> RefinedCatalog {
    let mut ingestor = Ingestor::new();
    ingestor.ingest_all(rows);
    ingestor.finish()
}
