//! Immutable catalog snapshots and copy-and-swap publication.
//!
//! A rebuild produces a fresh [`CatalogSnapshot`]; [`CatalogHandle::publish`]
//! swaps it in. Queries hold an `Arc` to whichever snapshot was current
//! when they started, so they never see a half-built catalog.

use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::MatchConfig;
use crate::matcher::SubstituteFinder;

use super::{Catalog, InvertedIndex};

/// A catalog and its index, frozen together.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub index: InvertedIndex,
    /// SHA-256 (hex) of the catalog contents
    pub fingerprint: String,
    /// RFC 3339 build time
    pub built_at: String,
}

impl CatalogSnapshot {
    pub fn new(catalog: Catalog, index: InvertedIndex) -> Self {
        let fingerprint = catalog_fingerprint(&catalog);
        Self {
            catalog,
            index,
            fingerprint,
            built_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Substitute finder over this snapshot.
    pub fn finder(&self, config: MatchConfig) -> SubstituteFinder<'_> {
        SubstituteFinder::new(&self.catalog, &self.index, config)
    }
}

/// Fingerprint of everything that affects query results.
pub fn catalog_fingerprint(catalog: &Catalog) -> String {
    let mut hasher = Sha256::new();
    for medicine in catalog.medicines() {
        hasher.update(medicine.medicine_id.to_le_bytes());
        update_str(&mut hasher, &medicine.name);
        hasher.update(medicine.price.to_bits().to_le_bytes());
        update_str(&mut hasher, medicine.category.as_str());
        hasher.update((medicine.composition.len() as u64).to_le_bytes());
        for entry in &medicine.composition {
            hasher.update(entry.drug_id.to_le_bytes());
            hasher.update(entry.amount.to_bits().to_le_bytes());
            update_str(&mut hasher, &entry.unit);
        }
    }
    hex::encode(hasher.finalize())
}

// Length prefix keeps ("ab", "c") and ("a", "bc") apart
fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Shared handle to the current snapshot.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogHandle {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot queries should run against right now.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        // Writers only swap the Arc; a poisoned lock still holds a full snapshot
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Swap in a new snapshot, returning the one it replaced.
    pub fn publish(&self, snapshot: CatalogSnapshot) -> Arc<CatalogSnapshot> {
        let next = Arc::new(snapshot);
        info!(
            fingerprint = %next.fingerprint,
            medicines = next.catalog.len(),
            "Publishing catalog snapshot"
        );
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }
}
