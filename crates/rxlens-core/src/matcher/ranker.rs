//! Substitute ranking.
//!
//! Scoring:
//! - Composition similarity: 70%
//! - Price (cheaper than the reference is better): 30%

use serde::{Deserialize, Serialize};

use crate::models::{CandidateScore, Medicine};

use super::signature::CompositionSignature;
use super::similarity::{similarity_with, MatchingStrategy, DEFAULT_DOSE_TOLERANCE};

/// Default number of substitutes returned.
pub const DEFAULT_TOP_K: usize = 10;

/// Floor for the reference price in the price ratio.
pub const PRICE_EPSILON: f64 = 1e-9;

/// Blend weights for the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub composition: f64,
    pub price: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            composition: 0.7,
            price: 0.3,
        }
    }
}

/// Price score in [0, 1]: 1 - min(1, candidate / max(reference, ε)).
///
/// A free reference makes every priced candidate score 0.
pub fn price_score(reference_price: f64, candidate_price: f64) -> f64 {
    let ratio = candidate_price / reference_price.max(PRICE_EPSILON);
    (1.0 - ratio.min(1.0)).clamp(0.0, 1.0)
}

/// Scores and orders candidates against a reference medicine.
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoreWeights,
    dose_tolerance: f64,
    strategy: MatchingStrategy,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl Ranker {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            dose_tolerance: DEFAULT_DOSE_TOLERANCE,
            strategy: MatchingStrategy::Greedy,
        }
    }

    pub fn with_dose_tolerance(mut self, dose_tolerance: f64) -> Self {
        self.dose_tolerance = dose_tolerance;
        self
    }

    pub fn with_strategy(mut self, strategy: MatchingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Score one candidate.
    pub fn score<'a>(
        &self,
        reference: &'a Medicine,
        reference_signature: &CompositionSignature,
        candidate: &'a Medicine,
    ) -> CandidateScore<'a> {
        let candidate_signature = CompositionSignature::from_medicine(candidate);
        let comp_similarity = similarity_with(
            reference_signature,
            &candidate_signature,
            self.dose_tolerance,
            self.strategy,
        );
        let price_score = price_score(reference.price, candidate.price);
        let score = self.weights.composition * comp_similarity + self.weights.price * price_score;

        CandidateScore {
            reference,
            medicine: candidate,
            score,
            comp_similarity,
            price_score,
        }
    }

    /// Score every candidate, sort by combined score (descending, ties in
    /// input order) and keep the first `top_k`.
    pub fn rank<'a>(
        &self,
        reference: &'a Medicine,
        candidates: impl IntoIterator<Item = &'a Medicine>,
        top_k: usize,
    ) -> Vec<CandidateScore<'a>> {
        let reference_signature = CompositionSignature::from_medicine(reference);
        let mut scored: Vec<CandidateScore<'a>> = candidates
            .into_iter()
            .map(|candidate| self.score(reference, &reference_signature, candidate))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }
}

/// Rank with the given weights and the default tolerance.
pub fn rank<'a>(
    reference: &'a Medicine,
    candidates: impl IntoIterator<Item = &'a Medicine>,
    weights: ScoreWeights,
    top_k: usize,
) -> Vec<CandidateScore<'a>> {
    Ranker::new(weights).rank(reference, candidates, top_k)
}
