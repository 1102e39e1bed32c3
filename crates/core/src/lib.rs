//! Pure domain logic for the shelfmark catalog: content hashing, patch
//! fields, import statuses, item types, and validation.
//!
//! This crate has no I/O and no async — everything here is usable from both
//! the storage layer and the import orchestrator.

pub mod clock;
pub mod error;
pub mod hashing;
pub mod import;
pub mod item;
pub mod patch;
pub mod search;
pub mod types;
