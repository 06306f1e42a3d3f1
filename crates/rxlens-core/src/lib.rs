//! RxLens Core Library
//!
//! Composition-based medicine substitute matching and ranking.
//!
//! # Architecture
//!
//! ```text
//! Raw product names ──► parse_dosage_text ──► refined rows (ingest crate)
//!                                                   │
//!                          CsvSource / Database ◄───┘
//!                                   │
//!                             load_catalog
//!                                   │
//!                     ┌─────────────▼─────────────┐
//!                     │  Catalog + InvertedIndex  │  immutable snapshot
//!                     └─────────────┬─────────────┘
//!                                   │
//!          medicine id ──► Candidate Retriever ──► Similarity ──► Ranker
//!                                                                   │
//!                                                       top-k CandidateScore
//! ```
//!
//! # Core Principle
//!
//! **Bad data degrades, it never fails.** Unparseable rows are skipped and
//! logged; unknown ids and empty compositions yield empty results.
//!
//! # Modules
//!
//! - [`dosage`]: Free-text dosage parser and unit normalizer
//! - [`models`]: Domain types (Medicine, CompositionEntry, CandidateScore, rows)
//! - [`catalog`]: In-memory catalog, inverted index, name search, snapshots
//! - [`matcher`]: Candidate retrieval, composition similarity, ranking
//! - [`source`]: Refined CSV and SQLite catalog sources
//! - [`db`]: SQLite storage for the refined tables
//! - [`config`]: Matching configuration

pub mod catalog;
pub mod config;
pub mod db;
pub mod dosage;
pub mod matcher;
pub mod models;
pub mod source;

// Re-export commonly used types
pub use catalog::{
    build_catalog, Catalog, CatalogBuilder, CatalogHandle, CatalogSnapshot, InvertedIndex,
    NameIndex,
};
pub use config::MatchConfig;
pub use db::Database;
pub use dosage::{parse_dosage_text, DosageParser, ParsedDosage, UnitNormalizer};
pub use matcher::{find_substitutes, PrescriptionReport, SubstituteFinder};
pub use models::{
    CandidateScore, Category, CompositionEntry, CompositionRow, Ingredient, IngredientRow,
    Medicine, MedicineRow, SubstituteRecord,
};
pub use source::{load_catalog, CatalogSource, CsvSource};

/// Errors surfaced to callers of the library (service layer, CLIs).
#[derive(Debug, thiserror::Error)]
pub enum RxLensError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<db::DbError> for RxLensError {
    fn from(e: db::DbError) -> Self {
        RxLensError::Database(e.to_string())
    }
}

impl From<source::SourceError> for RxLensError {
    fn from(e: source::SourceError) -> Self {
        RxLensError::Source(e.to_string())
    }
}

impl From<config::ConfigError> for RxLensError {
    fn from(e: config::ConfigError) -> Self {
        RxLensError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for RxLensError {
    fn from(e: serde_json::Error) -> Self {
        RxLensError::Serialization(e.to_string())
    }
}
