//! Catalog item entity and its search projection.

use serde::Serialize;
use shelfmark_core::item::{ItemCandidate, ItemInventory, ItemInventoryPatch};
use shelfmark_core::types::{new_entity_id, EntityId, HouseholdId, Timestamp};

/// A row from the `catalog_items` collection.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub id: EntityId,
    pub household_id: HouseholdId,
    /// Identifier carried over from the source system, used for merge
    /// matching on re-imports.
    pub external_id: Option<String>,
    pub title: String,
    pub inventory: ItemInventory,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CatalogItem {
    /// Insert shape for a candidate with no existing match: the inventory
    /// starts empty and the candidate's specified fields are applied to it.
    pub fn from_candidate(
        household_id: HouseholdId,
        candidate: &ItemCandidate,
        now: Timestamp,
    ) -> Self {
        let mut inventory = ItemInventory::default();
        candidate.inventory.apply_to(&mut inventory);
        Self {
            id: new_entity_id(),
            household_id,
            external_id: candidate.external_id.clone(),
            title: candidate.title.clone(),
            inventory,
            created_at: now,
            updated_at: now,
        }
    }

    /// Patch-merge inventory attributes, touching only specified fields.
    pub fn apply_patch(&mut self, patch: &ItemInventoryPatch, now: Timestamp) {
        patch.apply_to(&mut self.inventory);
        self.updated_at = now;
    }
}

/// Read-side shape used to verify catalog entries after an import. Never
/// mutated by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSearchProjection {
    pub id: EntityId,
    pub household_id: HouseholdId,
    pub title: String,
    pub external_id: Option<String>,
    pub barcode: Option<String>,
    pub location: Option<String>,
    pub updated_at: Timestamp,
}

impl From<&CatalogItem> for ItemSearchProjection {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            household_id: item.household_id,
            title: item.title.clone(),
            external_id: item.external_id.clone(),
            barcode: item.inventory.barcode.clone(),
            location: item.inventory.location.clone(),
            updated_at: item.updated_at,
        }
    }
}
