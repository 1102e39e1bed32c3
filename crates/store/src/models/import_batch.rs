//! Import batch entity: one bounded import run scoped to a household.

use serde::Serialize;
use shelfmark_core::error::CoreError;
use shelfmark_core::import::BatchStatus;
use shelfmark_core::types::{new_entity_id, EntityId, HouseholdId, Timestamp};

/// A row from the `import_batches` collection.
///
/// Invariants:
/// - `finished_at` is set if and only if `status` is terminal.
/// - `started_at <= finished_at` when both are present.
/// - A batch transitions to a terminal status exactly once and is an
///   immutable history record thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatch {
    pub id: EntityId,
    pub household_id: HouseholdId,
    /// Free text describing origin, e.g. "csv-upload".
    pub source: String,
    /// Original file name of the uploaded source document, if any.
    pub file_name: Option<String>,
    pub status: BatchStatus,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl ImportBatch {
    /// Open a new pending batch, stamping the start time.
    pub fn open(
        household_id: HouseholdId,
        source: impl Into<String>,
        file_name: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: new_entity_id(),
            household_id,
            source: source.into(),
            file_name,
            status: BatchStatus::Pending,
            started_at: now,
            finished_at: None,
        }
    }

    /// Transition to a terminal status, stamping the finish time.
    ///
    /// Calling this on an already-terminal batch is a contract violation and
    /// returns `CoreError::InvalidState`; it is never silently ignored.
    pub fn finalize(&mut self, status: BatchStatus, now: Timestamp) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "Batch {} is already {}",
                self.id, self.status
            )));
        }
        if !status.is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "Cannot finalize batch {} to non-terminal status {status}",
                self.id
            )));
        }
        self.status = status;
        self.finished_at = Some(now.max(self.started_at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn open_batch_is_pending_without_finish_time() {
        let batch = ImportBatch::open(new_entity_id(), "csv-upload", None, t0());
        assert_eq!(batch.status, BatchStatus::Pending);
        assert!(batch.finished_at.is_none());
        assert_eq!(batch.started_at, t0());
    }

    #[test]
    fn finalize_sets_finish_time_iff_terminal() {
        let mut batch = ImportBatch::open(new_entity_id(), "csv-upload", None, t0());
        batch
            .finalize(BatchStatus::Completed, t0() + Duration::seconds(5))
            .unwrap();

        assert_eq!(batch.status, BatchStatus::Completed);
        assert_eq!(batch.finished_at.is_some(), batch.status.is_terminal());
        assert!(batch.started_at <= batch.finished_at.unwrap());
    }

    #[test]
    fn double_finalize_is_invalid_state() {
        let mut batch = ImportBatch::open(new_entity_id(), "csv-upload", None, t0());
        batch.finalize(BatchStatus::Failed, t0()).unwrap();
        let err = batch.finalize(BatchStatus::Completed, t0()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn finalize_to_pending_rejected() {
        let mut batch = ImportBatch::open(new_entity_id(), "csv-upload", None, t0());
        assert!(batch.finalize(BatchStatus::Pending, t0()).is_err());
    }

    #[test]
    fn finish_never_precedes_start() {
        let mut batch = ImportBatch::open(new_entity_id(), "csv-upload", None, t0());
        // A skewed clock must not produce finished_at < started_at.
        batch
            .finalize(BatchStatus::Completed, t0() - Duration::seconds(3))
            .unwrap();
        assert!(batch.started_at <= batch.finished_at.unwrap());
    }
}
