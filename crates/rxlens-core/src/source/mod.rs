//! Where catalog rows come from.
//!
//! A [`CatalogSource`] yields the three refined tables; [`load_catalog`]
//! turns any source into a catalog, index pair.

mod csv;

pub use self::csv::*;

use thiserror::Error;
use tracing::info;

use crate::catalog::{Catalog, CatalogBuilder, CatalogSnapshot, InvertedIndex};
use crate::db::{Database, DbError};
use crate::models::{CompositionRow, IngredientRow, MedicineRow};

/// Source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Missing required file: {0}")]
    MissingFile(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Provider of refined catalog rows.
pub trait CatalogSource {
    /// Ingredient names. Sources without an ingredient table return none.
    fn ingredient_rows(&self) -> SourceResult<Vec<IngredientRow>>;

    fn medicine_rows(&self) -> SourceResult<Vec<MedicineRow>>;

    fn composition_rows(&self) -> SourceResult<Vec<CompositionRow>>;
}

/// Build a catalog and index from any source.
pub fn load_catalog(source: &impl CatalogSource) -> SourceResult<(Catalog, InvertedIndex)> {
    let ingredients = source.ingredient_rows()?;
    let medicines = source.medicine_rows()?;
    let compositions = source.composition_rows()?;
    info!(
        ingredients = ingredients.len(),
        medicines = medicines.len(),
        composition_rows = compositions.len(),
        "Loaded catalog rows"
    );

    Ok(CatalogBuilder::new()
        .ingredients(ingredients)
        .medicines(medicines)
        .compositions(compositions)
        .build())
}

/// Build a publishable snapshot from any source.
pub fn load_snapshot(source: &impl CatalogSource) -> SourceResult<CatalogSnapshot> {
    let (catalog, index) = load_catalog(source)?;
    Ok(CatalogSnapshot::new(catalog, index))
}

impl CatalogSource for Database {
    fn ingredient_rows(&self) -> SourceResult<Vec<IngredientRow>> {
        Ok(self.list_ingredient_rows()?)
    }

    fn medicine_rows(&self) -> SourceResult<Vec<MedicineRow>> {
        Ok(self.list_medicine_rows()?)
    }

    fn composition_rows(&self) -> SourceResult<Vec<CompositionRow>> {
        Ok(self.list_composition_rows()?)
    }
}
