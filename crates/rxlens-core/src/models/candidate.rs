//! Ranked substitute results.

use serde::{Deserialize, Serialize};

use super::Medicine;

/// A scored substitute for a reference medicine.
///
/// Borrows both medicines from the catalog; valid for the lifetime of the
/// query that produced it. Serializes to
/// `{medicine, score, comp_similarity, price_score}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateScore<'a> {
    #[serde(skip)]
    pub reference: &'a Medicine,
    pub medicine: &'a Medicine,
    /// Weighted blend of `comp_similarity` and `price_score`
    pub score: f64,
    /// Composition overlap (0.0 - 1.0)
    pub comp_similarity: f64,
    /// Relative cheapness versus the reference (0.0 - 1.0)
    pub price_score: f64,
}

impl<'a> CandidateScore<'a> {
    /// Detach from the catalog into an owned record.
    pub fn to_record(&self) -> SubstituteRecord {
        SubstituteRecord {
            medicine: self.medicine.clone(),
            score: self.score,
            comp_similarity: self.comp_similarity,
            price_score: self.price_score,
        }
    }
}

/// Owned form of [`CandidateScore`], for callers that deserialize results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubstituteRecord {
    pub medicine: Medicine,
    pub score: f64,
    pub comp_similarity: f64,
    pub price_score: f64,
}
