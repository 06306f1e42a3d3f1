//! Candidate retrieval through the inverted index.

use std::collections::HashSet;

use crate::catalog::{Catalog, InvertedIndex};
use crate::models::{CompositionEntry, Medicine, MedicineId};

/// Gathers every medicine sharing at least one ingredient with a reference.
pub struct CandidateRetriever<'a> {
    catalog: &'a Catalog,
    index: &'a InvertedIndex,
}

impl<'a> CandidateRetriever<'a> {
    pub fn new(catalog: &'a Catalog, index: &'a InvertedIndex) -> Self {
        Self { catalog, index }
    }

    /// Candidates for a composition, each once, in first-seen order
    /// (reference ingredient order, then index posting order).
    ///
    /// The reference itself is included when it is in the catalog; callers
    /// exclude it.
    pub fn retrieve(&self, composition: &[CompositionEntry]) -> Vec<&'a Medicine> {
        let mut seen: HashSet<MedicineId> = HashSet::new();
        let mut candidates = Vec::new();
        for entry in composition {
            for &medicine_id in self.index.medicines_for(entry.drug_id) {
                if !seen.insert(medicine_id) {
                    continue;
                }
                if let Some(medicine) = self.catalog.get(medicine_id) {
                    candidates.push(medicine);
                }
            }
        }
        candidates
    }
}

/// Free-function form of [`CandidateRetriever::retrieve`].
pub fn retrieve_candidates<'a>(
    composition: &[CompositionEntry],
    catalog: &'a Catalog,
    index: &'a InvertedIndex,
) -> Vec<&'a Medicine> {
    CandidateRetriever::new(catalog, index).retrieve(composition)
}
