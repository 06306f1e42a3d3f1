//! Dosage amount and unit normalizer.
//!
//! Handles:
//! - Ratio amounts ("125/5" → 25.0)
//! - Mass unit collapse onto mg (g→mg, mcg→mg, etc.)
//! - Pass-through of every non-mass unit (ml, iu, %w/w, mg/ml, ...)

use std::collections::HashMap;

use thiserror::Error;

/// Base unit for all mass amounts.
pub const BASE_MASS_UNIT: &str = "mg";

/// Largest accepted amount, after conversion. Signatures store amounts as
/// `i64` millionths, which saturate a little above 9.2e12.
pub const MAX_AMOUNT: f64 = 1e12;

/// Reasons a composition amount cannot be used.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,

    #[error("Unparseable amount: {0}")]
    Unparseable(String),

    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

/// Normalizer for parsed composition amounts.
pub struct UnitNormalizer {
    /// Mass conversions: unit → multiplier onto mg
    mass_conversions: HashMap<String, f64>,
}

impl Default for UnitNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitNormalizer {
    /// Create a normalizer with the default mass conversions.
    pub fn new() -> Self {
        Self {
            mass_conversions: Self::default_mass_conversions(),
        }
    }

    /// Normalize a raw amount/unit pair from a composition row.
    pub fn normalize(&self, amount: &str, unit: &str) -> Result<(f64, String), AmountError> {
        let value = resolve_amount(amount)?;
        let (converted, unit) = self.convert(value, unit);
        if converted > MAX_AMOUNT {
            return Err(AmountError::OutOfRange(amount.trim().to_string()));
        }
        Ok((converted, unit))
    }

    /// Convert an amount onto the base unit when the unit is a mass unit.
    /// Other units come back lowercased and trimmed, amount untouched.
    pub fn convert(&self, amount: f64, unit: &str) -> (f64, String) {
        let lower = unit.trim().to_lowercase();
        match self.mass_conversions.get(&lower) {
            Some(multiplier) => (amount * multiplier, BASE_MASS_UNIT.to_string()),
            None => (amount, lower),
        }
    }

    /// Add a custom mass unit conversion onto mg.
    pub fn add_mass_unit(&mut self, unit: &str, multiplier: f64) {
        self.mass_conversions.insert(unit.to_lowercase(), multiplier);
    }

    /// Default mass conversions.
    fn default_mass_conversions() -> HashMap<String, f64> {
        let mut map = HashMap::new();

        map.insert("mg".into(), 1.0);
        map.insert("g".into(), 1000.0);
        map.insert("gm".into(), 1000.0);
        map.insert("kg".into(), 1_000_000.0);

        // Micro sign (U+00B5) and Greek mu (U+03BC) both show up in exports
        map.insert("mcg".into(), 0.001);
        map.insert("\u{00b5}g".into(), 0.001);
        map.insert("\u{03bc}g".into(), 0.001);
        map.insert("ug".into(), 0.001);

        map
    }
}

/// Parse an amount that may be written as a ratio.
///
/// "125/5" divides; a zero or unparseable denominator falls back to the
/// numerator alone. Negative, non-finite and values above [`MAX_AMOUNT`]
/// are rejected.
pub fn resolve_amount(text: &str) -> Result<f64, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let value = match trimmed.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = parse_number(numerator, trimmed)?;
            match denominator.trim().parse::<f64>() {
                Ok(d) if d != 0.0 && d.is_finite() => numerator / d,
                _ => numerator,
            }
        }
        None => parse_number(trimmed, trimmed)?,
    };

    if !value.is_finite() || !(0.0..=MAX_AMOUNT).contains(&value) {
        return Err(AmountError::OutOfRange(trimmed.to_string()));
    }
    Ok(value)
}

fn parse_number(text: &str, original: &str) -> Result<f64, AmountError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| AmountError::Unparseable(original.to_string()))
}
