//! In-memory reference implementation of the storage capabilities.
//!
//! Backs the test suite and embedded deployments. Shared via
//! `Arc<MemoryStore>`; the uniqueness invariant on `(batch_id, digest)` is
//! enforced inside a single write-lock critical section, so check-then-insert
//! cannot race across concurrent batches.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shelfmark_core::hashing::ContentDigest;
use shelfmark_core::search::{clamp_limit, clamp_offset, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use shelfmark_core::types::{EntityId, HouseholdId};

use crate::error::StoreError;
use crate::models::{CatalogItem, ImportBatch, ImportRecord, ItemSearchProjection};
use crate::store::{BlobStore, CatalogStore, ImportStore};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Inner {
    batches: HashMap<EntityId, ImportBatch>,
    records: HashMap<EntityId, ImportRecord>,
    /// Insertion order per batch. For single-pass batches this matches
    /// `created_at` ascending even when a test clock stands still.
    record_order: HashMap<EntityId, Vec<EntityId>>,
    digest_index: HashMap<(EntityId, ContentDigest), EntityId>,
    items: HashMap<EntityId, CatalogItem>,
}

/// In-memory [`ImportStore`] + [`CatalogStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a household's batches, for test verification. Ordered by
    /// start time ascending, then id.
    pub async fn list_batches(&self, household_id: HouseholdId) -> Vec<ImportBatch> {
        let inner = self.inner.read().await;
        let mut batches: Vec<ImportBatch> = inner
            .batches
            .values()
            .filter(|batch| batch.household_id == household_id)
            .cloned()
            .collect();
        batches.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        batches
    }
}

#[async_trait]
impl ImportStore for MemoryStore {
    async fn insert_batch(&self, batch: ImportBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.batches.contains_key(&batch.id) {
            return Err(StoreError::UniqueViolation(format!(
                "import_batches.id {}",
                batch.id
            )));
        }
        inner.batches.insert(batch.id, batch);
        Ok(())
    }

    async fn get_batch(&self, id: EntityId) -> Result<Option<ImportBatch>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.batches.get(&id).cloned())
    }

    async fn update_batch(&self, batch: &ImportBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.batches.get_mut(&batch.id) {
            Some(existing) => {
                *existing = batch.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "ImportBatch",
                id: batch.id,
            }),
        }
    }

    async fn insert_record(&self, record: ImportRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = (record.batch_id, record.digest);
        if inner.digest_index.contains_key(&key) {
            return Err(StoreError::UniqueViolation(format!(
                "import_records (batch_id, digest) = ({}, {})",
                record.batch_id, record.digest
            )));
        }
        inner.digest_index.insert(key, record.id);
        inner
            .record_order
            .entry(record.batch_id)
            .or_default()
            .push(record.id);
        inner.records.insert(record.id, record);
        Ok(())
    }

    async fn find_record_by_digest(
        &self,
        batch_id: EntityId,
        digest: ContentDigest,
    ) -> Result<Option<ImportRecord>, StoreError> {
        let inner = self.inner.read().await;
        let record = inner
            .digest_index
            .get(&(batch_id, digest))
            .and_then(|id| inner.records.get(id))
            .cloned();
        Ok(record)
    }

    async fn update_record(&self, record: &ImportRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "ImportRecord",
                id: record.id,
            }),
        }
    }

    async fn list_records(&self, batch_id: EntityId) -> Result<Vec<ImportRecord>, StoreError> {
        let inner = self.inner.read().await;
        let ids = inner.record_order.get(&batch_id);
        let records = ids
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.records.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_item(&self, item: CatalogItem) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.items.contains_key(&item.id) {
            return Err(StoreError::UniqueViolation(format!(
                "catalog_items.id {}",
                item.id
            )));
        }
        inner.items.insert(item.id, item);
        Ok(())
    }

    async fn update_item(&self, item: &CatalogItem) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner.items.get_mut(&item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "CatalogItem",
                id: item.id,
            }),
        }
    }

    async fn find_by_external_id(
        &self,
        household_id: HouseholdId,
        external_id: &str,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.inner.read().await;
        let mut items: Vec<CatalogItem> = inner
            .items
            .values()
            .filter(|item| {
                item.household_id == household_id
                    && item.external_id.as_deref() == Some(external_id)
            })
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn find_by_title(
        &self,
        household_id: HouseholdId,
        title: &str,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let inner = self.inner.read().await;
        let mut items: Vec<CatalogItem> = inner
            .items
            .values()
            .filter(|item| item.household_id == household_id && item.title == title)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn search_items(
        &self,
        household_id: HouseholdId,
        query: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ItemSearchProjection>, StoreError> {
        let limit = clamp_limit(limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT) as usize;
        let offset = clamp_offset(offset) as usize;
        let needle = query.to_lowercase();

        let inner = self.inner.read().await;
        let mut matches: Vec<&CatalogItem> = inner
            .items
            .values()
            .filter(|item| {
                item.household_id == household_id && item.title.to_lowercase().contains(&needle)
            })
            .collect();
        matches.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        Ok(matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(ItemSearchProjection::from)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryBlobStore
// ---------------------------------------------------------------------------

/// In-memory [`BlobStore`]. URLs use the `memory://` scheme.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch stored bytes, for test verification.
    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        let blobs = self.blobs.read().await;
        blobs.get(path).map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(format!("memory://{path}"))
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        let mut blobs = self.blobs.write().await;
        Ok(blobs.remove(path).is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use shelfmark_core::item::parse_candidate;
    use shelfmark_core::types::{new_entity_id, Timestamp};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn new_batch() -> ImportBatch {
        ImportBatch::open(new_entity_id(), "csv-upload", None, t0())
    }

    fn new_record(batch_id: EntityId, payload: &[u8]) -> ImportRecord {
        ImportRecord::pending(batch_id, payload.to_vec(), None, t0())
    }

    // -- batch CRUD ---------------------------------------------------------

    #[tokio::test]
    async fn batch_insert_and_get() {
        let store = MemoryStore::new();
        let batch = new_batch();
        let id = batch.id;
        store.insert_batch(batch).await.unwrap();

        let fetched = store.get_batch(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.source, "csv-upload");
    }

    #[tokio::test]
    async fn update_missing_batch_is_not_found() {
        let store = MemoryStore::new();
        let batch = new_batch();
        let err = store.update_batch(&batch).await.unwrap_err();
        assert_matches!(err, StoreError::NotFound { entity: "ImportBatch", .. });
    }

    // -- record uniqueness ----------------------------------------------------

    #[tokio::test]
    async fn duplicate_digest_in_same_batch_rejected() {
        let store = MemoryStore::new();
        let batch = new_batch();
        let batch_id = batch.id;
        store.insert_batch(batch).await.unwrap();

        store
            .insert_record(new_record(batch_id, br#"{"title":"Dune"}"#))
            .await
            .unwrap();
        let err = store
            .insert_record(new_record(batch_id, br#"{"title":"Dune"}"#))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::UniqueViolation(_));
    }

    #[tokio::test]
    async fn same_payload_in_different_batches_allowed() {
        let store = MemoryStore::new();
        let a = new_entity_id();
        let b = new_entity_id();
        store
            .insert_record(new_record(a, br#"{"title":"Dune"}"#))
            .await
            .unwrap();
        store
            .insert_record(new_record(b, br#"{"title":"Dune"}"#))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn find_record_by_digest_round_trips() {
        let store = MemoryStore::new();
        let batch_id = new_entity_id();
        let record = new_record(batch_id, br#"{"title":"Dune"}"#);
        let digest = record.digest;
        store.insert_record(record).await.unwrap();

        let found = store
            .find_record_by_digest(batch_id, digest)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.digest, digest);

        let other = ContentDigest::of(b"something else");
        assert!(store
            .find_record_by_digest(batch_id, other)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_records_preserves_insertion_order() {
        let store = MemoryStore::new();
        let batch_id = new_entity_id();
        for i in 0..5 {
            let payload = format!(r#"{{"title":"Book {i}"}}"#);
            store
                .insert_record(new_record(batch_id, payload.as_bytes()))
                .await
                .unwrap();
        }

        let records = store.list_records(batch_id).await.unwrap();
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            let expected = format!(r#"{{"title":"Book {i}"}}"#);
            assert_eq!(record.payload, expected.as_bytes());
        }
    }

    // -- catalog scoping --------------------------------------------------------

    #[tokio::test]
    async fn external_id_lookup_is_household_scoped() {
        let store = MemoryStore::new();
        let ours = new_entity_id();
        let theirs = new_entity_id();
        let candidate =
            parse_candidate(br#"{"title":"Dune","external_id":"bk-1"}"#).unwrap();

        store
            .insert_item(CatalogItem::from_candidate(ours, &candidate, t0()))
            .await
            .unwrap();
        store
            .insert_item(CatalogItem::from_candidate(theirs, &candidate, t0()))
            .await
            .unwrap();

        let found = store.find_by_external_id(ours, "bk-1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].household_id, ours);
    }

    #[tokio::test]
    async fn search_items_filters_and_paginates() {
        let store = MemoryStore::new();
        let household = new_entity_id();
        for title in ["Dune", "Dune Messiah", "Children of Dune", "Emma"] {
            let payload = format!(r#"{{"title":"{title}"}}"#);
            let candidate = parse_candidate(payload.as_bytes()).unwrap();
            store
                .insert_item(CatalogItem::from_candidate(household, &candidate, t0()))
                .await
                .unwrap();
        }

        let all = store
            .search_items(household, "dune", None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "Children of Dune");

        let page = store
            .search_items(household, "dune", Some(2), Some(2))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    // -- blob store ---------------------------------------------------------------

    #[tokio::test]
    async fn blob_upload_and_delete() {
        let blobs = MemoryBlobStore::new();
        let url = blobs
            .upload("imports/b1/export.csv", b"a,b,c".to_vec(), "text/csv")
            .await
            .unwrap();
        assert_eq!(url, "memory://imports/b1/export.csv");
        assert_eq!(blobs.get("imports/b1/export.csv").await.unwrap(), b"a,b,c");

        assert!(blobs.delete("imports/b1/export.csv").await.unwrap());
        assert!(!blobs.delete("imports/b1/export.csv").await.unwrap());
    }
}
