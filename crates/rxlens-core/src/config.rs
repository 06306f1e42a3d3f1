//! Matching configuration.
//!
//! ```json
//! {
//!   "weights": { "composition": 0.7, "price": 0.3 },
//!   "dose_tolerance": 0.05,
//!   "top_k": 10,
//!   "matching": "greedy",
//!   "name_match_threshold": 0.6
//! }
//! ```
//!
//! Every field is optional; missing ones take the defaults above.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::{MatchingStrategy, ScoreWeights, DEFAULT_DOSE_TOLERANCE, DEFAULT_TOP_K};

/// Default minimum score for a name search hit.
pub const DEFAULT_NAME_MATCH_THRESHOLD: f64 = 0.60;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for substitute search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub weights: ScoreWeights,
    /// Relative dose difference still counted as a match
    pub dose_tolerance: f64,
    pub top_k: usize,
    pub matching: MatchingStrategy,
    pub name_match_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            dose_tolerance: DEFAULT_DOSE_TOLERANCE,
            top_k: DEFAULT_TOP_K,
            matching: MatchingStrategy::default(),
            name_match_threshold: DEFAULT_NAME_MATCH_THRESHOLD,
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let ScoreWeights { composition, price } = self.weights;
        if !composition.is_finite() || composition < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "weights.composition must be a non-negative number, got {}",
                composition
            )));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "weights.price must be a non-negative number, got {}",
                price
            )));
        }
        if composition == 0.0 && price == 0.0 {
            return Err(ConfigError::Invalid("weights cannot both be zero".into()));
        }
        if !(0.0..=1.0).contains(&self.dose_tolerance) {
            return Err(ConfigError::Invalid(format!(
                "dose_tolerance must be within [0, 1], got {}",
                self.dose_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.name_match_threshold) {
            return Err(ConfigError::Invalid(format!(
                "name_match_threshold must be within [0, 1], got {}",
                self.name_match_threshold
            )));
        }
        Ok(())
    }
}
