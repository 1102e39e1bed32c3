//! Persisted entities and storage capabilities for the import core.
//!
//! The relational and blob backends are consumed as capabilities: this crate
//! defines the entity models, the [`store`] traits the import path programs
//! against, and an in-memory reference implementation ([`memory`]) used by
//! tests and embedded deployments. Backends must enforce the
//! `(batch_id, digest)` uniqueness constraint atomically; the import path's
//! own existence check is only a fast path.

pub mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use error::StoreError;
pub use memory::{MemoryBlobStore, MemoryStore};
pub use store::{BlobStore, CatalogStore, ImportStore};
