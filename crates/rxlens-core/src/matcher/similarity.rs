//! Composition similarity under a relative dose tolerance.
//!
//! Two entries match when they name the same ingredient in the same unit
//! and their amounts differ by at most `tolerance * max(a, b, ε)`. Units
//! are never converted here; "mg" and "ml" simply do not match.

use serde::{Deserialize, Serialize};

use super::signature::{CompositionSignature, SignatureEntry};

/// Default relative dose tolerance (5%).
pub const DEFAULT_DOSE_TOLERANCE: f64 = 0.05;

/// Floor for the tolerance base so near-zero doses still compare.
pub const DOSE_EPSILON: f64 = 1e-9;

/// How matched entries are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Count every matching (a, b) pair. An entry may match several
    /// counterparts; the score is capped at 1.0.
    #[default]
    Greedy,
    /// Maximum bipartite matching; each entry is used at most once.
    OneToOne,
}

/// Whether two amounts are within `tolerance` of each other.
pub fn dose_matches(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.max(b).max(DOSE_EPSILON)
}

/// Similarity in [0, 1] with greedy pair counting.
pub fn composition_similarity(
    a: &CompositionSignature,
    b: &CompositionSignature,
    tolerance: f64,
) -> f64 {
    similarity_with(a, b, tolerance, MatchingStrategy::Greedy)
}

/// Similarity in [0, 1]: matched entries over the larger signature.
///
/// Two empty signatures score 0.0; otherwise equal signatures score 1.0.
pub fn similarity_with(
    a: &CompositionSignature,
    b: &CompositionSignature,
    tolerance: f64,
    strategy: MatchingStrategy,
) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a: Vec<&SignatureEntry> = a.entries().collect();
    let b: Vec<&SignatureEntry> = b.entries().collect();
    let matched = match strategy {
        MatchingStrategy::Greedy => greedy_matches(&a, &b, tolerance),
        MatchingStrategy::OneToOne => one_to_one_matches(&a, &b, tolerance),
    };

    let denominator = a.len().max(b.len());
    (matched as f64 / denominator as f64).min(1.0)
}

fn entries_match(a: &SignatureEntry, b: &SignatureEntry, tolerance: f64) -> bool {
    a.drug_id == b.drug_id && a.unit == b.unit && dose_matches(a.amount(), b.amount(), tolerance)
}

fn greedy_matches(a: &[&SignatureEntry], b: &[&SignatureEntry], tolerance: f64) -> usize {
    a.iter()
        .map(|ea| b.iter().filter(|eb| entries_match(ea, eb, tolerance)).count())
        .sum()
}

/// Kuhn's augmenting-path matching. Signatures are a handful of entries,
/// so the quadratic-per-augment cost does not matter.
fn one_to_one_matches(a: &[&SignatureEntry], b: &[&SignatureEntry], tolerance: f64) -> usize {
    let adjacency: Vec<Vec<usize>> = a
        .iter()
        .map(|ea| {
            b.iter()
                .enumerate()
                .filter(|(_, eb)| entries_match(ea, eb, tolerance))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; b.len()];
    let mut matched = 0;
    for i in 0..a.len() {
        let mut visited = vec![false; b.len()];
        if augment(i, &adjacency, &mut owner, &mut visited) {
            matched += 1;
        }
    }
    matched
}

fn augment(
    i: usize,
    adjacency: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &j in &adjacency[i] {
        if visited[j] {
            continue;
        }
        visited[j] = true;
        let free = match owner[j] {
            None => true,
            Some(k) => augment(k, adjacency, owner, visited),
        };
        if free {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompositionEntry;

    fn sig(entries: &[(i64, f64, &str)]) -> CompositionSignature {
        let composition: Vec<CompositionEntry> = entries
            .iter()
            .map(|&(drug_id, amount, unit)| CompositionEntry {
                drug_id,
                amount,
                unit: unit.into(),
            })
            .collect();
        CompositionSignature::from_composition(&composition)
    }

    #[test]
    fn test_identical_is_one() {
        let a = sig(&[(1, 500.0, "mg"), (2, 30.0, "mg")]);
        assert_eq!(composition_similarity(&a, &a.clone(), DEFAULT_DOSE_TOLERANCE), 1.0);
    }

    #[test]
    fn test_empty_cases() {
        let empty = sig(&[]);
        let a = sig(&[(1, 500.0, "mg")]);

        assert_eq!(composition_similarity(&empty, &empty, DEFAULT_DOSE_TOLERANCE), 0.0);
        assert_eq!(composition_similarity(&a, &empty, DEFAULT_DOSE_TOLERANCE), 0.0);
        assert_eq!(composition_similarity(&empty, &a, DEFAULT_DOSE_TOLERANCE), 0.0);
    }

    #[test]
    fn test_four_percent_matches_six_does_not() {
        let reference = sig(&[(1, 100.0, "mg")]);

        let close = sig(&[(1, 104.0, "mg")]);
        assert_eq!(composition_similarity(&reference, &close, DEFAULT_DOSE_TOLERANCE), 1.0);

        let far = sig(&[(1, 106.0, "mg")]);
        assert_eq!(composition_similarity(&reference, &far, DEFAULT_DOSE_TOLERANCE), 0.0);
    }

    #[test]
    fn test_unit_is_a_hard_gate() {
        let a = sig(&[(1, 5.0, "mg")]);
        let b = sig(&[(1, 5.0, "ml")]);
        assert_eq!(composition_similarity(&a, &b, DEFAULT_DOSE_TOLERANCE), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // Amoxycillin + Clavulanate vs Amoxycillin alone
        let combo = sig(&[(1, 500.0, "mg"), (2, 125.0, "mg")]);
        let single = sig(&[(1, 500.0, "mg")]);
        assert_eq!(composition_similarity(&combo, &single, DEFAULT_DOSE_TOLERANCE), 0.5);
    }

    #[test]
    fn test_zero_doses_match() {
        let a = sig(&[(1, 0.0, "mg"), (2, 1.0, "mg")]);
        let b = sig(&[(1, 0.0, "mg"), (2, 9.0, "mg")]);
        assert_eq!(composition_similarity(&a, &b, DEFAULT_DOSE_TOLERANCE), 0.5);
    }

    #[test]
    fn test_greedy_double_counts_but_caps() {
        let a = sig(&[(1, 100.0, "mg"), (1, 101.0, "mg")]);
        let b = sig(&[(1, 100.0, "mg")]);

        assert_eq!(similarity_with(&a, &b, DEFAULT_DOSE_TOLERANCE, MatchingStrategy::Greedy), 1.0);
        assert_eq!(similarity_with(&a, &b, DEFAULT_DOSE_TOLERANCE, MatchingStrategy::OneToOne), 0.5);
    }

    #[test]
    fn test_one_to_one_finds_augmenting_path() {
        // 100mg fits both 98mg and 104mg, 96mg only fits 98mg
        let a = sig(&[(1, 100.0, "mg"), (1, 96.0, "mg")]);
        let b = sig(&[(1, 98.0, "mg"), (1, 104.0, "mg")]);

        assert_eq!(similarity_with(&a, &b, DEFAULT_DOSE_TOLERANCE, MatchingStrategy::OneToOne), 1.0);
    }

    #[test]
    fn test_dose_matches() {
        assert!(dose_matches(100.0, 105.0, 0.05));
        assert!(!dose_matches(100.0, 105.3, 0.05));
        assert!(dose_matches(0.0, 0.0, 0.05));
        assert!(!dose_matches(0.0, 1.0, 0.05));
    }
}
