//! Dosage text parsing and unit normalization.
//!
//! Pipeline: raw composition text → [`DosageParser`] → (name, amount, unit)
//! → [`UnitNormalizer`] → comparable amounts

mod normalizer;
mod parser;
pub mod units;

pub use normalizer::*;
pub use parser::*;

/// Parse a dosage string with the default parser.
pub fn parse_dosage_text(raw: &str) -> Vec<ParsedDosage> {
    DosageParser::new().parse(raw)
}
