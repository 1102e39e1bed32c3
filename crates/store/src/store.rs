//! Storage capability traits.
//!
//! The import path programs against these traits; concrete backends live
//! behind them. A backend must enforce the `(batch_id, digest)` uniqueness
//! constraint atomically at write time — the import path's existence check
//! is a fast path, not the source of truth.

use async_trait::async_trait;
use shelfmark_core::hashing::ContentDigest;
use shelfmark_core::types::{EntityId, HouseholdId};

use crate::error::StoreError;
use crate::models::{CatalogItem, ImportBatch, ImportRecord, ItemSearchProjection};

/// Durable keyed storage for import batches and their records.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// Persist a new batch. One durable write.
    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), StoreError>;

    /// Fetch a batch by id.
    async fn get_batch(&self, id: EntityId) -> Result<Option<ImportBatch>, StoreError>;

    /// Persist updated batch state (finalization).
    async fn update_batch(&self, batch: &ImportBatch) -> Result<(), StoreError>;

    /// Persist a new record. Rejects a duplicate `(batch_id, digest)` pair
    /// with [`StoreError::UniqueViolation`].
    async fn insert_record(&self, record: ImportRecord) -> Result<(), StoreError>;

    /// Look up a record by its dedup key.
    async fn find_record_by_digest(
        &self,
        batch_id: EntityId,
        digest: ContentDigest,
    ) -> Result<Option<ImportRecord>, StoreError>;

    /// Persist updated record state (terminal transition).
    async fn update_record(&self, record: &ImportRecord) -> Result<(), StoreError>;

    /// All records of a batch, ordered by creation time ascending.
    async fn list_records(&self, batch_id: EntityId) -> Result<Vec<ImportRecord>, StoreError>;
}

/// Durable keyed storage for catalog items. Every lookup is household-scoped;
/// there is no global key.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_item(&self, item: CatalogItem) -> Result<(), StoreError>;

    async fn update_item(&self, item: &CatalogItem) -> Result<(), StoreError>;

    /// All items in the household carrying this external id.
    async fn find_by_external_id(
        &self,
        household_id: HouseholdId,
        external_id: &str,
    ) -> Result<Vec<CatalogItem>, StoreError>;

    /// All items in the household with exactly this title.
    async fn find_by_title(
        &self,
        household_id: HouseholdId,
        title: &str,
    ) -> Result<Vec<CatalogItem>, StoreError>;

    /// Case-insensitive title substring search, ordered by title, paginated
    /// with the clamping rules from `shelfmark_core::search`.
    async fn search_items(
        &self,
        household_id: HouseholdId,
        query: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ItemSearchProjection>, StoreError>;
}

/// Blob storage capability, used only to archive uploaded source documents.
/// Not involved in hashing or dedup, which operate on in-memory bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at a path and return a retrievable URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;

    /// Delete by path. Returns whether anything was deleted.
    async fn delete(&self, path: &str) -> Result<bool, StoreError>;
}
