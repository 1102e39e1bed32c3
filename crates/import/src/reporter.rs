//! Operator-facing projections over terminal batch state.
//!
//! Aggregations are computed on demand — batches are small and bounded, so
//! nothing is cached. A completed-with-failures batch is a success with a
//! non-zero failure count, never an overall error; operators consult the
//! failure list to triage.

use std::sync::Arc;

use serde::Serialize;

use shelfmark_core::import::RecordStatus;
use shelfmark_core::types::EntityId;
use shelfmark_store::models::ImportRecordFailure;
use shelfmark_store::{ImportStore, StoreError};

use crate::error::ImportError;

/// Per-status record counts for one batch. `total` counts persisted records
/// only; duplicates never create a record, so for a fully-attempted batch
/// `total == completed + failed`. `pending` is non-zero only for abandoned
/// (cancelled) runs awaiting reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Read-side reporting over a batch's records.
pub struct ImportReporter {
    imports: Arc<dyn ImportStore>,
}

impl ImportReporter {
    pub fn new(imports: Arc<dyn ImportStore>) -> Self {
        Self { imports }
    }

    /// Aggregate the batch's records into per-status counts.
    pub async fn summarize(&self, batch_id: EntityId) -> Result<BatchSummary, ImportError> {
        self.ensure_batch_exists(batch_id).await?;

        let mut summary = BatchSummary::default();
        for record in self.imports.list_records(batch_id).await? {
            summary.total += 1;
            match record.status {
                RecordStatus::Completed => summary.completed += 1,
                RecordStatus::Failed => summary.failed += 1,
                RecordStatus::Pending => summary.pending += 1,
            }
        }
        Ok(summary)
    }

    /// The batch's failures, ordered by record creation time ascending.
    /// Re-queries the store on every call; safe to call repeatedly.
    pub async fn failures(
        &self,
        batch_id: EntityId,
    ) -> Result<Vec<ImportRecordFailure>, ImportError> {
        self.ensure_batch_exists(batch_id).await?;

        let failures = self
            .imports
            .list_records(batch_id)
            .await?
            .iter()
            .filter_map(|record| record.failure_projection())
            .collect();
        Ok(failures)
    }

    async fn ensure_batch_exists(&self, batch_id: EntityId) -> Result<(), ImportError> {
        self.imports
            .get_batch(batch_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "ImportBatch",
                id: batch_id,
            })?;
        Ok(())
    }
}
