//! Ingredient registry.

use std::collections::HashMap;

use rxlens_core::models::{DrugId, IngredientRow};

/// Assigns stable ids to ingredient names in first-seen order.
///
/// Names are keyed case-insensitively; the first spelling seen is kept as
/// the display name.
#[derive(Debug, Default)]
pub struct DrugRegistry {
    ids: HashMap<String, DrugId>,
    rows: Vec<IngredientRow>,
}

impl DrugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Return the id for `name`, allocating the next one if it is new.
    pub fn register(&mut self, name: &str) -> DrugId {
        let key = Self::key(name);
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.rows.len() as DrugId + 1;
        self.ids.insert(key, id);
        self.rows.push(IngredientRow {
            drug_id: id,
            drug_name: name.trim().to_string(),
        });
        id
    }

    pub fn get(&self, name: &str) -> Option<DrugId> {
        self.ids.get(&Self::key(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Registered ingredients in id order.
    pub fn rows(&self) -> &[IngredientRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<IngredientRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut registry = DrugRegistry::new();

        assert_eq!(registry.register("Paracetamol"), 1);
        assert_eq!(registry.register("Caffeine"), 2);
        assert_eq!(registry.register("Paracetamol"), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_case_insensitive_key() {
        let mut registry = DrugRegistry::new();
        registry.register("Clavulanic Acid");

        assert_eq!(registry.register("clavulanic  ACID"), 1);
        assert_eq!(registry.get("CLAVULANIC ACID"), Some(1));
        assert_eq!(registry.get("Amoxycillin"), None);
        assert_eq!(registry.rows()[0].drug_name, "Clavulanic Acid");
    }
}
