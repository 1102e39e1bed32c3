//! Persisted entity structs and projections.
//!
//! Each submodule contains:
//! - A `Serialize` entity struct matching the persisted row
//! - Constructors that stamp timestamps from an injected now
//! - Single-transition state changes that reject terminal re-entry
//! - Read-side projections derived from the entity

pub mod catalog_item;
pub mod import_batch;
pub mod import_record;

pub use catalog_item::{CatalogItem, ItemSearchProjection};
pub use import_batch::ImportBatch;
pub use import_record::{ImportRecord, ImportRecordFailure};
