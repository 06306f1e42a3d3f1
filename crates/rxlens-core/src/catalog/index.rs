//! Ingredient → medicine inverted index.

use std::collections::HashMap;

use crate::models::{DrugId, Medicine, MedicineId};

use super::Catalog;

/// Posting lists from ingredient id to the medicines containing it.
///
/// Each list holds every medicine whose composition mentions the ingredient,
/// once, in catalog load order.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<DrugId, Vec<MedicineId>>,
}

impl InvertedIndex {
    /// Build postings from medicines in load order.
    pub fn build(medicines: &[Medicine]) -> Self {
        let mut postings: HashMap<DrugId, Vec<MedicineId>> = HashMap::new();
        for medicine in medicines {
            for drug_id in medicine.ingredient_ids() {
                postings.entry(drug_id).or_default().push(medicine.medicine_id);
            }
        }
        Self { postings }
    }

    /// Medicines containing `drug_id`; empty for unknown ingredients.
    pub fn medicines_for(&self, drug_id: DrugId) -> &[MedicineId] {
        self.postings
            .get(&drug_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of ingredients with at least one posting.
    pub fn ingredient_count(&self) -> usize {
        self.postings.len()
    }

    /// Total number of (ingredient, medicine) postings.
    pub fn posting_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    /// Check the index against a catalog: every posting points at a medicine
    /// containing that ingredient, and every composition line is posted.
    pub fn is_consistent_with(&self, catalog: &Catalog) -> bool {
        let postings_valid = self.postings.iter().all(|(drug_id, ids)| {
            ids.iter().all(|id| {
                catalog
                    .get(*id)
                    .map_or(false, |m| m.composition.iter().any(|e| e.drug_id == *drug_id))
            })
        });
        let compositions_posted = catalog.medicines().iter().all(|medicine| {
            medicine
                .ingredient_ids()
                .into_iter()
                .all(|drug_id| self.medicines_for(drug_id).contains(&medicine.medicine_id))
        });
        postings_valid && compositions_posted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::models::{CompositionEntry, CompositionRow, MedicineRow};

    fn medicine(id: MedicineId, drugs: &[DrugId]) -> Medicine {
        let mut m = Medicine::new(id, format!("M{}", id));
        m.composition = drugs
            .iter()
            .map(|&drug_id| CompositionEntry {
                drug_id,
                amount: 10.0,
                unit: "mg".into(),
            })
            .collect();
        m
    }

    #[test]
    fn test_postings_in_load_order() {
        let medicines = vec![medicine(5, &[1, 2]), medicine(3, &[2]), medicine(9, &[1])];
        let index = InvertedIndex::build(&medicines);

        assert_eq!(index.medicines_for(1), &[5, 9]);
        assert_eq!(index.medicines_for(2), &[5, 3]);
        assert!(index.medicines_for(42).is_empty());
        assert_eq!(index.ingredient_count(), 2);
        assert_eq!(index.posting_count(), 4);
    }

    #[test]
    fn test_repeated_ingredient_posted_once() {
        let medicines = vec![medicine(1, &[7, 7])];
        let index = InvertedIndex::build(&medicines);

        assert_eq!(index.medicines_for(7), &[1]);
    }

    #[test]
    fn test_consistency_with_catalog() {
        let (catalog, index) = build_catalog(
            vec![MedicineRow::new(1, "A"), MedicineRow::new(2, "B")],
            vec![
                CompositionRow::new(1, 10, "5", "mg"),
                CompositionRow::new(2, 10, "5", "mg"),
                CompositionRow::new(2, 11, "1", "ml"),
            ],
        );
        assert!(index.is_consistent_with(&catalog));

        let stale = InvertedIndex::build(&[medicine(1, &[99])]);
        assert!(!stale.is_consistent_with(&catalog));
    }
}
