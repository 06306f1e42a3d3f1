//! Tabular rows consumed by the catalog builder.
//!
//! Field names follow the refined ingestion tables, so the same structs
//! deserialize from CSV records, SQLite rows and JSON.

use serde::{Deserialize, Deserializer, Serialize};

use super::{DrugId, MedicineId};

/// One row of the ingredient table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientRow {
    pub drug_id: DrugId,
    pub drug_name: String,
}

/// One row of the medicine table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineRow {
    pub medicine_id: MedicineId,
    #[serde(rename = "medicine_name", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub unit_size: String,
    /// MRP; an empty cell reads as 0
    #[serde(rename = "mrp", alias = "price", default, deserialize_with = "price_or_zero")]
    pub price: f64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub category: String,
}

/// One row of the composition table. Amount and unit stay as raw text until
/// the catalog builder normalizes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompositionRow {
    pub medicine_id: MedicineId,
    pub drug_id: DrugId,
    pub amount: String,
    #[serde(default)]
    pub unit: String,
}

impl MedicineRow {
    /// Create a row with only the required fields set.
    pub fn new(medicine_id: MedicineId, name: impl Into<String>) -> Self {
        Self {
            medicine_id,
            name: name.into(),
            unit_size: String::new(),
            price: 0.0,
            group_name: String::new(),
            category: String::new(),
        }
    }
}

impl CompositionRow {
    pub fn new(
        medicine_id: MedicineId,
        drug_id: DrugId,
        amount: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            medicine_id,
            drug_id,
            amount: amount.into(),
            unit: unit.into(),
        }
    }
}

fn price_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medicine_row_accepts_refined_headers() {
        let json = r#"{"medicine_id":22,"medicine_name":"Paracetamol Tablets IP 500 mg","unit_size":"10's","mrp":9.5,"group_name":"Analgesic","category":"tablet"}"#;
        let row: MedicineRow = serde_json::from_str(json).unwrap();

        assert_eq!(row.medicine_id, 22);
        assert_eq!(row.name, "Paracetamol Tablets IP 500 mg");
        assert_eq!(row.price, 9.5);
    }

    #[test]
    fn test_medicine_row_missing_price_is_zero() {
        let json = r#"{"medicine_id":1,"name":"Unknown Price","price":null}"#;
        let row: MedicineRow = serde_json::from_str(json).unwrap();

        assert_eq!(row.price, 0.0);
        assert!(row.category.is_empty());
    }
}
