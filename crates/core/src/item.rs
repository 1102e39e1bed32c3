//! Catalog item domain types for the import path.
//!
//! Provides:
//! - [`ItemInventory`]: the inventory attributes carried by a catalog item
//! - [`ItemInventoryPatch`]: a bundle of [`PatchField`]s applied to an item
//! - [`ItemCandidate`]: the parsed shape of one import payload
//! - [`parse_candidate`]: structural parsing of raw payload bytes
//!
//! Parsing checks structural well-formedness only; schema validation beyond
//! that is out of scope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::patch::PatchField;

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Inventory attributes of a catalog item. All optional; a freshly inserted
/// item starts with whatever its candidate specified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInventory {
    pub barcode: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub acquired_on: Option<NaiveDate>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

/// A partial update to an item's inventory attributes. Only fields marked
/// specified are applied; everything else is left as-is on the target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInventoryPatch {
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub barcode: PatchField<Option<String>>,
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub location: PatchField<Option<String>>,
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub status: PatchField<Option<String>>,
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub condition: PatchField<Option<String>>,
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub acquired_on: PatchField<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub price: PatchField<Option<f64>>,
    #[serde(default, skip_serializing_if = "skip_unspecified")]
    pub notes: PatchField<Option<String>>,
}

fn skip_unspecified<T>(field: &PatchField<T>) -> bool {
    !field.is_specified()
}

impl ItemInventoryPatch {
    /// Apply every specified field to `inventory`, leaving the rest alone.
    pub fn apply_to(&self, inventory: &mut ItemInventory) {
        self.barcode.clone().apply_to(&mut inventory.barcode);
        self.location.clone().apply_to(&mut inventory.location);
        self.status.clone().apply_to(&mut inventory.status);
        self.condition.clone().apply_to(&mut inventory.condition);
        self.acquired_on.apply_to(&mut inventory.acquired_on);
        self.price.apply_to(&mut inventory.price);
        self.notes.clone().apply_to(&mut inventory.notes);
    }

    /// Whether no field is specified at all.
    pub fn is_empty(&self) -> bool {
        !(self.barcode.is_specified()
            || self.location.is_specified()
            || self.status.is_specified()
            || self.condition.is_specified()
            || self.acquired_on.is_specified()
            || self.price.is_specified()
            || self.notes.is_specified())
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// One import payload parsed into a catalog item candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCandidate {
    /// Identifier assigned by the source system, used for merge matching.
    pub external_id: Option<String>,
    /// Title of the work/edition. Required for inserts.
    pub title: String,
    /// Inventory fields mentioned by the payload.
    #[serde(flatten)]
    pub inventory: ItemInventoryPatch,
}

/// Parse raw payload bytes (UTF-8 JSON) into a candidate.
///
/// Only structural well-formedness is checked here; merge conflicts are the
/// merge strategy's concern.
pub fn parse_candidate(payload: &[u8]) -> Result<ItemCandidate, CoreError> {
    let candidate: ItemCandidate = serde_json::from_slice(payload)
        .map_err(|e| CoreError::Validation(format!("Malformed payload: {e}")))?;
    if candidate.title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Payload is missing a non-empty title".to_string(),
        ));
    }
    Ok(candidate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn shelved_inventory() -> ItemInventory {
        ItemInventory {
            barcode: None,
            location: Some("Shelf A".to_string()),
            status: Some("available".to_string()),
            condition: None,
            acquired_on: None,
            price: Some(12.5),
            notes: None,
        }
    }

    // -- apply_to tests -----------------------------------------------------

    #[test]
    fn unspecified_fields_leave_target_untouched() {
        let mut inventory = shelved_inventory();
        let patch = ItemInventoryPatch {
            barcode: PatchField::from(Some("123".to_string())),
            ..Default::default()
        };
        patch.apply_to(&mut inventory);

        assert_eq!(inventory.barcode.as_deref(), Some("123"));
        assert_eq!(inventory.location.as_deref(), Some("Shelf A"));
        assert_eq!(inventory.price, Some(12.5));
    }

    #[test]
    fn explicit_null_clears_target_field() {
        let mut inventory = shelved_inventory();
        let patch = ItemInventoryPatch {
            location: PatchField::from(None),
            ..Default::default()
        };
        patch.apply_to(&mut inventory);

        assert!(inventory.location.is_none());
        assert_eq!(inventory.status.as_deref(), Some("available"));
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(ItemInventoryPatch::default().is_empty());
        let patch = ItemInventoryPatch {
            notes: PatchField::from(Some("gift".to_string())),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    // -- parse_candidate tests ------------------------------------------------

    #[test]
    fn parses_minimal_payload() {
        let candidate = parse_candidate(br#"{"title":"Dune"}"#).unwrap();
        assert_eq!(candidate.title, "Dune");
        assert!(candidate.external_id.is_none());
        assert!(candidate.inventory.is_empty());
    }

    #[test]
    fn parses_inventory_fields() {
        let candidate = parse_candidate(
            br#"{"title":"Dune","external_id":"bk-1","barcode":"123","location":null}"#,
        )
        .unwrap();
        assert_eq!(candidate.external_id.as_deref(), Some("bk-1"));
        assert!(candidate.inventory.barcode.is_specified());
        // Explicit null: specified, clearing.
        assert!(candidate.inventory.location.is_specified());
        assert!(candidate
            .inventory
            .location
            .as_specified()
            .unwrap()
            .is_none());
        // Never mentioned: unspecified.
        assert!(!candidate.inventory.notes.is_specified());
    }

    #[test]
    fn malformed_json_rejected() {
        let err = parse_candidate(b"{not json").unwrap_err();
        assert!(err.to_string().contains("Malformed payload"));
    }

    #[test]
    fn missing_title_rejected() {
        assert!(parse_candidate(br#"{"barcode":"123"}"#).is_err());
    }

    #[test]
    fn blank_title_rejected() {
        assert!(parse_candidate(br#"{"title":"   "}"#).is_err());
    }

    #[test]
    fn parses_acquired_date_and_price() {
        let candidate = parse_candidate(
            br#"{"title":"Dune","acquired_on":"2024-03-01","price":9.99}"#,
        )
        .unwrap();
        assert_eq!(
            *candidate.inventory.acquired_on.as_specified().unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(*candidate.inventory.price.as_specified().unwrap(), Some(9.99));
    }
}
