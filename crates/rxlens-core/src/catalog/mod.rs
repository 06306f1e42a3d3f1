//! In-memory medicine catalog.
//!
//! Built once from tabular rows, immutable afterwards. Data-quality problems
//! in the rows (bad amounts, orphan composition lines, duplicate ids) are
//! logged and skipped; they never abort the build.

mod index;
mod search;
mod snapshot;

pub use index::*;
pub use search::*;
pub use snapshot::*;

use std::collections::HashMap;

use tracing::{info, warn};

use crate::dosage::UnitNormalizer;
use crate::models::{
    Category, CompositionEntry, CompositionRow, DrugId, Ingredient, IngredientRow, Medicine,
    MedicineId, MedicineRow,
};

/// Counters collected while building a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub medicines: usize,
    pub ingredients: usize,
    pub composition_rows: usize,
    /// Rows whose amount could not be parsed
    pub dropped_rows: usize,
    /// Rows pointing at a medicine id the catalog does not have
    pub orphan_rows: usize,
    /// Medicine rows skipped because their id was already taken
    pub duplicate_medicines: usize,
    /// Medicines with no usable composition
    pub empty_compositions: usize,
}

/// Read-only collection of medicines and ingredients.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    medicines: Vec<Medicine>,
    positions: HashMap<MedicineId, usize>,
    ingredients: HashMap<DrugId, Ingredient>,
    stats: BuildStats,
}

impl Catalog {
    /// Look up a medicine by id.
    pub fn get(&self, medicine_id: MedicineId) -> Option<&Medicine> {
        self.positions
            .get(&medicine_id)
            .map(|&position| &self.medicines[position])
    }

    pub fn contains(&self, medicine_id: MedicineId) -> bool {
        self.positions.contains_key(&medicine_id)
    }

    /// All medicines in load order.
    pub fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }

    pub fn len(&self) -> usize {
        self.medicines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medicines.is_empty()
    }

    /// Look up an ingredient by id.
    pub fn ingredient(&self, drug_id: DrugId) -> Option<&Ingredient> {
        self.ingredients.get(&drug_id)
    }

    /// Display name of an ingredient, if the ingredient table was loaded.
    pub fn ingredient_name(&self, drug_id: DrugId) -> Option<&str> {
        self.ingredient(drug_id).map(|i| i.name.as_str())
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Counters from the build that produced this catalog.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

/// Assembles a [`Catalog`] and its [`InvertedIndex`] from rows.
#[derive(Default)]
pub struct CatalogBuilder {
    ingredients: Vec<IngredientRow>,
    medicines: Vec<MedicineRow>,
    compositions: Vec<CompositionRow>,
    normalizer: UnitNormalizer,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingredient names; optional, compositions only need the ids.
    pub fn ingredients(mut self, rows: impl IntoIterator<Item = IngredientRow>) -> Self {
        self.ingredients.extend(rows);
        self
    }

    pub fn medicines(mut self, rows: impl IntoIterator<Item = MedicineRow>) -> Self {
        self.medicines.extend(rows);
        self
    }

    pub fn compositions(mut self, rows: impl IntoIterator<Item = CompositionRow>) -> Self {
        self.compositions.extend(rows);
        self
    }

    /// Use a custom unit normalizer.
    pub fn normalizer(mut self, normalizer: UnitNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Build the catalog and index.
    pub fn build(self) -> (Catalog, InvertedIndex) {
        let mut stats = BuildStats::default();

        let mut ingredients = HashMap::with_capacity(self.ingredients.len());
        for row in self.ingredients {
            if ingredients.contains_key(&row.drug_id) {
                warn!(drug_id = row.drug_id, "Duplicate ingredient id, keeping first");
                continue;
            }
            ingredients.insert(
                row.drug_id,
                Ingredient {
                    drug_id: row.drug_id,
                    name: row.drug_name,
                },
            );
        }

        let mut medicines: Vec<Medicine> = Vec::with_capacity(self.medicines.len());
        let mut positions = HashMap::with_capacity(self.medicines.len());
        for row in self.medicines {
            if positions.contains_key(&row.medicine_id) {
                warn!(medicine_id = row.medicine_id, "Duplicate medicine id, keeping first");
                stats.duplicate_medicines += 1;
                continue;
            }
            positions.insert(row.medicine_id, medicines.len());
            medicines.push(medicine_from_row(row));
        }

        for row in self.compositions {
            stats.composition_rows += 1;
            let Some(&position) = positions.get(&row.medicine_id) else {
                warn!(
                    medicine_id = row.medicine_id,
                    drug_id = row.drug_id,
                    "Composition row for unknown medicine, skipping"
                );
                stats.orphan_rows += 1;
                continue;
            };
            match self.normalizer.normalize(&row.amount, &row.unit) {
                Ok((amount, unit)) => medicines[position].composition.push(CompositionEntry {
                    drug_id: row.drug_id,
                    amount,
                    unit,
                }),
                Err(e) => {
                    warn!(
                        medicine_id = row.medicine_id,
                        drug_id = row.drug_id,
                        amount = %row.amount,
                        error = %e,
                        "Dropping malformed composition row"
                    );
                    stats.dropped_rows += 1;
                }
            }
        }

        let index = InvertedIndex::build(&medicines);

        stats.medicines = medicines.len();
        stats.ingredients = ingredients.len();
        stats.empty_compositions = medicines.iter().filter(|m| !m.has_composition()).count();

        info!(
            medicines = stats.medicines,
            ingredients = stats.ingredients,
            indexed_ingredients = index.ingredient_count(),
            dropped_rows = stats.dropped_rows,
            orphan_rows = stats.orphan_rows,
            empty_compositions = stats.empty_compositions,
            "Catalog built"
        );

        let catalog = Catalog {
            medicines,
            positions,
            ingredients,
            stats,
        };
        (catalog, index)
    }
}

fn medicine_from_row(row: MedicineRow) -> Medicine {
    let price = if row.price.is_finite() && row.price >= 0.0 {
        row.price
    } else {
        warn!(medicine_id = row.medicine_id, price = row.price, "Invalid price, using 0");
        0.0
    };
    Medicine {
        medicine_id: row.medicine_id,
        name: row.name,
        price,
        unit_size: row.unit_size,
        group_name: row.group_name,
        category: Category::parse(&row.category),
        composition: Vec::new(),
    }
}

/// Build a catalog and index from medicine and composition rows.
pub fn build_catalog(
    medicine_rows: impl IntoIterator<Item = MedicineRow>,
    composition_rows: impl IntoIterator<Item = CompositionRow>,
) -> (Catalog, InvertedIndex) {
    CatalogBuilder::new()
        .medicines(medicine_rows)
        .compositions(composition_rows)
        .build()
}
