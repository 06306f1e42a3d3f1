//! Order-independent composition signatures.

use std::collections::BTreeSet;

use crate::models::{CompositionEntry, DrugId, Medicine};

/// Amounts are compared at this many steps per unit (6 decimal places).
pub const SIGNATURE_SCALE: f64 = 1_000_000.0;

/// One (ingredient, rounded amount, unit) triple.
///
/// The amount is stored as an integer count of millionths so that entries
/// can be compared and ordered exactly. The cast saturates above about
/// 9.2e12; catalog amounts are capped well below that by
/// [`crate::dosage::MAX_AMOUNT`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignatureEntry {
    pub drug_id: DrugId,
    pub scaled_amount: i64,
    pub unit: String,
}

impl SignatureEntry {
    pub fn from_entry(entry: &CompositionEntry) -> Self {
        Self {
            drug_id: entry.drug_id,
            scaled_amount: (entry.amount * SIGNATURE_SCALE).round() as i64,
            unit: entry.unit.clone(),
        }
    }

    /// Rounded amount as a float.
    pub fn amount(&self) -> f64 {
        self.scaled_amount as f64 / SIGNATURE_SCALE
    }
}

/// Set of signature entries for one medicine. Repeated identical lines
/// collapse into one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionSignature {
    entries: BTreeSet<SignatureEntry>,
}

impl CompositionSignature {
    pub fn from_composition(composition: &[CompositionEntry]) -> Self {
        Self {
            entries: composition.iter().map(SignatureEntry::from_entry).collect(),
        }
    }

    pub fn from_medicine(medicine: &Medicine) -> Self {
        Self::from_composition(&medicine.composition)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SignatureEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SignatureEntry> for CompositionSignature {
    fn from_iter<I: IntoIterator<Item = SignatureEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(drug_id: DrugId, amount: f64, unit: &str) -> CompositionEntry {
        CompositionEntry {
            drug_id,
            amount,
            unit: unit.into(),
        }
    }

    #[test]
    fn test_order_independent() {
        let a = CompositionSignature::from_composition(&[entry(1, 500.0, "mg"), entry(2, 30.0, "mg")]);
        let b = CompositionSignature::from_composition(&[entry(2, 30.0, "mg"), entry(1, 500.0, "mg")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rounds_to_six_places() {
        let a = CompositionSignature::from_composition(&[entry(1, 0.1 + 0.2, "mg")]);
        let b = CompositionSignature::from_composition(&[entry(1, 0.3, "mg")]);
        assert_eq!(a, b);

        let c = CompositionSignature::from_composition(&[entry(1, 0.300001, "mg")]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_duplicates_collapse() {
        let sig = CompositionSignature::from_composition(&[entry(1, 5.0, "mg"), entry(1, 5.0, "mg")]);
        assert_eq!(sig.len(), 1);
        assert_eq!(sig.entries().next().unwrap().amount(), 5.0);
    }

    #[test]
    fn test_unit_is_part_of_identity() {
        let sig = CompositionSignature::from_composition(&[entry(1, 5.0, "mg"), entry(1, 5.0, "ml")]);
        assert_eq!(sig.len(), 2);
    }
}
