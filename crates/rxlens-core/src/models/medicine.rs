//! Medicine catalog models.

use serde::{Deserialize, Serialize};

/// Catalog-wide medicine identifier.
pub type MedicineId = i64;

/// Catalog-wide ingredient identifier.
pub type DrugId = i64;

/// A distinct active ingredient, keyed by its normalized name at ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub drug_id: DrugId,
    pub name: String,
}

/// Dosage form of a medicine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tablet,
    Capsule,
    Injection,
    Syrup,
    Spray,
    Gel,
    Cream,
    Ointment,
    Solution,
    Drops,
    #[default]
    Unknown,
}

/// Keyword → category, checked in order against lowercased product names.
const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("tablet", Category::Tablet),
    ("tablets", Category::Tablet),
    ("capsule", Category::Capsule),
    ("capsules", Category::Capsule),
    ("injection", Category::Injection),
    ("syrup", Category::Syrup),
    ("spray", Category::Spray),
    ("gel", Category::Gel),
    ("cream", Category::Cream),
    ("ointment", Category::Ointment),
    ("solution", Category::Solution),
    ("drop", Category::Drops),
    ("drops", Category::Drops),
];

impl Category {
    /// Derive the category from a free-text product name.
    ///
    /// The first keyword contained anywhere in the name wins, so
    /// "Tablet" beats "Gel" in "Gel Coated Tablet".
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Unknown)
    }

    /// Parse a stored category label ("tablet", "Drops", ...).
    pub fn parse(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == lower)
            .map(|(_, category)| *category)
            .unwrap_or(Category::Unknown)
    }

    /// Canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tablet => "tablet",
            Category::Capsule => "capsule",
            Category::Injection => "injection",
            Category::Syrup => "syrup",
            Category::Spray => "spray",
            Category::Gel => "gel",
            Category::Cream => "cream",
            Category::Ointment => "ointment",
            Category::Solution => "solution",
            Category::Drops => "drops",
            Category::Unknown => "unknown",
        }
    }

    /// Every keyword that names a dosage form, singular and plural.
    pub fn keywords() -> impl Iterator<Item = &'static str> {
        CATEGORY_KEYWORDS.iter().map(|(keyword, _)| *keyword)
    }
}

/// One ingredient line of a medicine's composition, after unit normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionEntry {
    pub drug_id: DrugId,
    /// Non-negative amount in `unit`
    pub amount: f64,
    /// Canonical unit ("mg", "ml", "%w/w", ...); empty when unspecified
    pub unit: String,
}

/// A medicine in the catalog. Immutable once the catalog is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    pub medicine_id: MedicineId,
    /// Display name as listed by the supplier
    pub name: String,
    /// Maximum retail price; 0 when unknown
    pub price: f64,
    /// Pack description (e.g., "10 tablets")
    pub unit_size: String,
    pub group_name: String,
    pub category: Category,
    pub composition: Vec<CompositionEntry>,
}

impl Medicine {
    /// Create a medicine with an empty composition.
    pub fn new(medicine_id: MedicineId, name: String) -> Self {
        Self {
            medicine_id,
            name,
            price: 0.0,
            unit_size: String::new(),
            group_name: String::new(),
            category: Category::Unknown,
            composition: Vec::new(),
        }
    }

    /// Whether any composition line survived parsing.
    pub fn has_composition(&self) -> bool {
        !self.composition.is_empty()
    }

    /// Distinct ingredient ids in composition order.
    pub fn ingredient_ids(&self) -> Vec<DrugId> {
        let mut ids: Vec<DrugId> = Vec::with_capacity(self.composition.len());
        for entry in &self.composition {
            if !ids.contains(&entry.drug_id) {
                ids.push(entry.drug_id);
            }
        }
        ids
    }
}
