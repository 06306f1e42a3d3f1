//! # RxLens Ingest
//!
//! Refines the raw Jan Aushadhi product export into the ingredient,
//! medicine and composition tables that `rxlens_core` loads.
//!
//! ```text
//! raw.csv ──► read_raw_products ──► Ingestor ──► RefinedCatalog
//!                                    │ parse dosage      ├─► write_csv
//!                                    │ register drugs    ├─► write_to_database
//!                                    └ derive category   └─► build
//! ```

pub mod error;
pub mod pipeline;
pub mod raw;
pub mod registry;

pub use error::{IngestError, IngestResult};
pub use pipeline::{refine, IngestStats, Ingestor, RefinedCatalog};
pub use raw::{parse_mrp, read_raw_products, RawProductRow};
pub use registry::DrugRegistry;
