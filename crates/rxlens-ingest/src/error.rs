//! Ingestion errors.

use thiserror::Error;

use rxlens_core::db::DbError;
use rxlens_core::source::SourceError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Raw export is missing column: {0}")]
    MissingColumn(String),
}

pub type IngestResult<T> = Result<T, IngestError>;
