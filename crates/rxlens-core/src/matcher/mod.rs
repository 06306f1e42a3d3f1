//! Substitute matching: retrieval, similarity and ranking.
//!
//! Query pipeline:
//! 1. Look up the reference medicine (unknown id → no substitutes)
//! 2. Retrieve every medicine sharing an ingredient via the inverted index
//! 3. Drop the reference itself
//! 4. Rank by weighted composition similarity and price, keep top-k

mod prescription;
mod ranker;
mod retriever;
mod signature;
mod similarity;

pub use prescription::*;
pub use ranker::*;
pub use retriever::*;
pub use signature::*;
pub use similarity::*;

use std::collections::HashSet;
use std::sync::OnceLock;

use tracing::debug;

use crate::catalog::{Catalog, InvertedIndex, NameIndex, NameMatch};
use crate::config::MatchConfig;
use crate::models::{CandidateScore, Medicine, MedicineId};

/// A medicine found by name, with its substitutes.
#[derive(Debug, Clone)]
pub struct NameLookup<'a> {
    pub medicine: &'a Medicine,
    /// Name match score in [0, 1]
    pub name_score: f64,
    pub substitutes: Vec<CandidateScore<'a>>,
}

/// Query entry point over one catalog and index.
pub struct SubstituteFinder<'a> {
    catalog: &'a Catalog,
    index: &'a InvertedIndex,
    config: MatchConfig,
    ranker: Ranker,
    names: OnceLock<NameIndex>,
}

impl<'a> SubstituteFinder<'a> {
    pub fn new(catalog: &'a Catalog, index: &'a InvertedIndex, config: MatchConfig) -> Self {
        let ranker = Ranker::new(config.weights)
            .with_dose_tolerance(config.dose_tolerance)
            .with_strategy(config.matching);
        Self {
            catalog,
            index,
            config,
            ranker,
            names: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Substitutes for `medicine_id`, `top_k` from the config.
    pub fn find(&self, medicine_id: MedicineId) -> Vec<CandidateScore<'a>> {
        self.find_top(medicine_id, self.config.top_k)
    }

    /// Substitutes for `medicine_id`. Unknown ids and medicines without a
    /// composition yield an empty list.
    pub fn find_top(&self, medicine_id: MedicineId, top_k: usize) -> Vec<CandidateScore<'a>> {
        let Some(reference) = self.catalog.get(medicine_id) else {
            debug!(medicine_id, "Unknown medicine id");
            return Vec::new();
        };
        self.substitutes_for(reference, top_k)
    }

    fn substitutes_for(&self, reference: &'a Medicine, top_k: usize) -> Vec<CandidateScore<'a>> {
        let candidates: Vec<&'a Medicine> = CandidateRetriever::new(self.catalog, self.index)
            .retrieve(&reference.composition)
            .into_iter()
            .filter(|m| m.medicine_id != reference.medicine_id)
            .collect();

        debug!(
            medicine_id = reference.medicine_id,
            candidates = candidates.len(),
            "Retrieved substitute candidates"
        );

        self.ranker.rank(reference, candidates, top_k)
    }

    fn name_index(&self) -> &NameIndex {
        self.names.get_or_init(|| NameIndex::build(self.catalog))
    }

    /// Medicines whose names best match `query`.
    pub fn search_names(&self, query: &str, limit: usize) -> Vec<NameMatch> {
        self.name_index().search(query, limit)
    }

    /// Resolve a free-text name and find substitutes for the best match.
    /// `None` when no name reaches the configured threshold.
    pub fn find_by_name(&self, query: &str, top_k: usize) -> Option<NameLookup<'a>> {
        let best = self
            .name_index()
            .best_match(query, self.config.name_match_threshold)?;
        let medicine = self.catalog.get(best.medicine_id)?;
        Some(NameLookup {
            medicine,
            name_score: best.score,
            substitutes: self.substitutes_for(medicine, top_k),
        })
    }

    /// Look up every prescribed name and collect substitutes.
    ///
    /// Blank names are skipped; a repeated name is reported once.
    pub fn analyze_prescription<S: AsRef<str>>(
        &self,
        names: &[S],
        top_k: usize,
    ) -> PrescriptionReport {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut results = Vec::new();

        for name in names {
            let query = name.as_ref().trim();
            if query.is_empty() || !seen.insert(query) {
                continue;
            }

            let outcome = match self.find_by_name(query, top_k) {
                Some(lookup) => PrescriptionOutcome::Found {
                    original_medicine: lookup.medicine.clone(),
                    similarity_score: lookup.name_score,
                    substitutes: lookup.substitutes.iter().map(CandidateScore::to_record).collect(),
                },
                None => PrescriptionOutcome::NotFound {
                    best_match_score: self.name_index().closest(query).map_or(0.0, |m| m.score),
                },
            };
            results.push(PrescriptionEntry {
                query: query.to_string(),
                outcome,
            });
        }

        let report = PrescriptionReport::from_entries(results);
        debug!(
            total = report.summary.total_medicines,
            found = report.summary.found_count,
            "Analyzed prescription"
        );
        report
    }
}

/// Substitutes for `medicine_id` with the default weights and tolerance.
pub fn find_substitutes<'a>(
    medicine_id: MedicineId,
    catalog: &'a Catalog,
    index: &'a InvertedIndex,
    top_k: usize,
) -> Vec<CandidateScore<'a>> {
    SubstituteFinder::new(catalog, index, MatchConfig::default()).find_top(medicine_id, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::models::{CompositionRow, MedicineRow};

    fn priced(id: MedicineId, name: &str, price: f64) -> MedicineRow {
        let mut row = MedicineRow::new(id, name);
        row.price = price;
        row
    }

    fn fixture() -> (Catalog, InvertedIndex) {
        build_catalog(
            vec![
                priced(1, "Paracetamol Tablets IP 500 mg", 20.0),
                priced(2, "Paracetamol Tablets IP 500 mg (Strip of 15)", 10.0),
                priced(3, "Paracetamol Tablets IP 650 mg", 15.0),
                priced(4, "Paracetamol and Caffeine Tablets", 25.0),
                priced(5, "Cough Linctus", 40.0),
            ],
            vec![
                CompositionRow::new(1, 10, "500", "mg"),
                CompositionRow::new(2, 10, "0.5", "g"),
                CompositionRow::new(3, 10, "650", "mg"),
                CompositionRow::new(4, 10, "500", "mg"),
                CompositionRow::new(4, 11, "30", "mg"),
            ],
        )
    }

    #[test]
    fn test_find_substitutes_orders_and_excludes_self() {
        let (catalog, index) = fixture();
        let results = find_substitutes(1, &catalog, &index, 10);

        let ids: Vec<MedicineId> = results.iter().map(|c| c.medicine.medicine_id).collect();
        // 2: same dose, half price; 4: half the composition; 3: dose too far
        assert_eq!(ids, vec![2, 4, 3]);
        assert_eq!(results[0].comp_similarity, 1.0);
        assert_eq!(results[0].price_score, 0.5);
        assert_eq!(results[1].comp_similarity, 0.5);
        assert!(results.iter().all(|c| c.reference.medicine_id == 1));
    }

    #[test]
    fn test_unknown_and_empty_references() {
        let (catalog, index) = fixture();

        assert!(find_substitutes(999, &catalog, &index, 10).is_empty());
        assert!(find_substitutes(5, &catalog, &index, 10).is_empty());
    }

    #[test]
    fn test_top_k() {
        let (catalog, index) = fixture();
        let finder = SubstituteFinder::new(&catalog, &index, MatchConfig::default());

        assert_eq!(finder.find_top(1, 1).len(), 1);
        assert_eq!(finder.find_top(1, 0).len(), 0);
        assert_eq!(finder.find(1).len(), 3);
    }

    #[test]
    fn test_find_by_name() {
        let (catalog, index) = fixture();
        let finder = SubstituteFinder::new(&catalog, &index, MatchConfig::default());

        let lookup = finder.find_by_name("paracetamol caffeine", 5).unwrap();
        assert_eq!(lookup.medicine.medicine_id, 4);
        assert_eq!(lookup.name_score, 1.0);
        assert!(lookup.substitutes.iter().all(|c| c.medicine.medicine_id != 4));

        assert!(finder.find_by_name("zzz", 5).is_none());
    }

    #[test]
    fn test_analyze_prescription() {
        let (catalog, index) = fixture();
        let finder = SubstituteFinder::new(&catalog, &index, MatchConfig::default());

        let report = finder.analyze_prescription(
            &["Paracetamol Caffeine", "  ", "zzz", "Paracetamol Caffeine"],
            5,
        );

        assert_eq!(report.summary.total_medicines, 2);
        assert_eq!(report.summary.found_count, 1);
        assert_eq!(report.summary.not_found_count, 1);
        assert_eq!(report.summary.total_alternatives, 3);

        assert_eq!(report.results[0].query, "Paracetamol Caffeine");
        match &report.results[1].outcome {
            PrescriptionOutcome::NotFound { best_match_score } => assert!(*best_match_score < 0.6),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_prescription_rejects_unrelated_drug_with_shared_prefix() {
        let (catalog, index) = build_catalog(
            vec![
                priced(1, "Amlodipine Tablets IP 5 mg", 12.0),
                priced(2, "Amlodipine Tablets IP 10 mg", 18.0),
            ],
            vec![
                CompositionRow::new(1, 20, "5", "mg"),
                CompositionRow::new(2, 20, "10", "mg"),
            ],
        );
        let finder = SubstituteFinder::new(&catalog, &index, MatchConfig::default());

        assert!(finder.find_by_name("Atorvastatin Tablets", 5).is_none());

        let report = finder.analyze_prescription(&["Atorvastatin Tablets"], 5);
        assert_eq!(report.summary.found_count, 0);
        assert_eq!(report.summary.total_alternatives, 0);
        match &report.results[0].outcome {
            PrescriptionOutcome::NotFound { best_match_score } => {
                assert!(*best_match_score > 0.5 && *best_match_score < 0.6)
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }
}
