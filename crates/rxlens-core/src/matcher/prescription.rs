//! Prescription analysis reports.

use serde::{Deserialize, Serialize};

use crate::models::{Medicine, SubstituteRecord};

/// Substitutes for every medicine named on a prescription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionReport {
    pub summary: PrescriptionSummary,
    pub results: Vec<PrescriptionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionSummary {
    pub total_medicines: usize,
    pub found_count: usize,
    pub not_found_count: usize,
    /// Substitutes across all found medicines
    pub total_alternatives: usize,
}

/// Result for one prescribed name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionEntry {
    /// The name as written on the prescription (trimmed)
    pub query: String,
    #[serde(flatten)]
    pub outcome: PrescriptionOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrescriptionOutcome {
    Found {
        original_medicine: Medicine,
        /// Name match score in [0, 1]
        similarity_score: f64,
        substitutes: Vec<SubstituteRecord>,
    },
    NotFound {
        /// Best name score seen, below the threshold
        best_match_score: f64,
    },
}

impl PrescriptionOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, PrescriptionOutcome::Found { .. })
    }

    pub fn alternative_count(&self) -> usize {
        match self {
            PrescriptionOutcome::Found { substitutes, .. } => substitutes.len(),
            PrescriptionOutcome::NotFound { .. } => 0,
        }
    }
}

impl PrescriptionReport {
    /// Assemble a report and its summary from per-name results.
    pub fn from_entries(results: Vec<PrescriptionEntry>) -> Self {
        let found_count = results.iter().filter(|e| e.outcome.is_found()).count();
        let summary = PrescriptionSummary {
            total_medicines: results.len(),
            found_count,
            not_found_count: results.len() - found_count,
            total_alternatives: results.iter().map(|e| e.outcome.alternative_count()).sum(),
        };
        Self { summary, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let found = PrescriptionEntry {
            query: "Paracetamol".into(),
            outcome: PrescriptionOutcome::Found {
                original_medicine: Medicine::new(1, "Paracetamol Tablets".into()),
                similarity_score: 1.0,
                substitutes: Vec::new(),
            },
        };
        let missing = PrescriptionEntry {
            query: "Unobtainium".into(),
            outcome: PrescriptionOutcome::NotFound {
                best_match_score: 0.2,
            },
        };

        let report = PrescriptionReport::from_entries(vec![found, missing]);
        assert_eq!(
            report.summary,
            PrescriptionSummary {
                total_medicines: 2,
                found_count: 1,
                not_found_count: 1,
                total_alternatives: 0,
            }
        );
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = PrescriptionEntry {
            query: "Unobtainium".into(),
            outcome: PrescriptionOutcome::NotFound {
                best_match_score: 0.25,
            },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["query"], "Unobtainium");
        assert_eq!(value["best_match_score"], 0.25);

        let back: PrescriptionEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
