//! Import record entity: one payload within a batch, identified by its
//! content digest.

use serde::Serialize;
use shelfmark_core::error::CoreError;
use shelfmark_core::hashing::ContentDigest;
use shelfmark_core::import::RecordStatus;
use shelfmark_core::types::{new_entity_id, EntityId, Timestamp};

/// A row from the `import_records` collection.
///
/// Invariants:
/// - `(batch_id, digest)` is unique within the store; a second occurrence of
///   byte-identical payload bytes in the same batch never creates a record.
/// - `error` is present if and only if `status == Failed`.
/// - Status transitions Pending → Completed or Pending → Failed exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRecord {
    pub id: EntityId,
    pub batch_id: EntityId,
    /// Identifier supplied by the source system, if any.
    pub external_id: Option<String>,
    /// Raw payload bytes as submitted (serialized structured text).
    pub payload: Vec<u8>,
    /// SHA-256 of the raw payload bytes; the dedup key within the batch.
    pub digest: ContentDigest,
    pub status: RecordStatus,
    /// Human-readable failure message, present iff `status == Failed`.
    pub error: Option<String>,
    pub created_at: Timestamp,
    /// When the record reached a terminal status.
    pub processed_at: Option<Timestamp>,
}

impl ImportRecord {
    /// Create a pending record for a payload first seen in `batch_id`.
    ///
    /// The digest is computed here so callers cannot persist a record whose
    /// digest disagrees with its payload bytes.
    pub fn pending(
        batch_id: EntityId,
        payload: Vec<u8>,
        external_id: Option<String>,
        now: Timestamp,
    ) -> Self {
        let digest = ContentDigest::of(&payload);
        Self {
            id: new_entity_id(),
            batch_id,
            external_id,
            payload,
            digest,
            status: RecordStatus::Pending,
            error: None,
            created_at: now,
            processed_at: None,
        }
    }

    /// Mark the record completed. Terminal re-entry is a contract violation.
    pub fn complete(&mut self, now: Timestamp) -> Result<(), CoreError> {
        self.transition(RecordStatus::Completed, None, now)
    }

    /// Mark the record failed with a human-readable message.
    pub fn fail(&mut self, message: impl Into<String>, now: Timestamp) -> Result<(), CoreError> {
        self.transition(RecordStatus::Failed, Some(message.into()), now)
    }

    fn transition(
        &mut self,
        status: RecordStatus,
        error: Option<String>,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidState(format!(
                "Record {} is already {}",
                self.id, self.status
            )));
        }
        self.status = status;
        self.error = error;
        self.processed_at = Some(now);
        Ok(())
    }

    /// Project a failed record into its operator-facing failure shape.
    /// Returns `None` for records that did not fail.
    pub fn failure_projection(&self) -> Option<ImportRecordFailure> {
        match (&self.status, &self.error) {
            (RecordStatus::Failed, Some(error)) => Some(ImportRecordFailure {
                record_id: self.id,
                external_id: self.external_id.clone(),
                created_at: self.created_at,
                processed_at: self.processed_at,
                error: error.clone(),
            }),
            _ => None,
        }
    }
}

/// Operator-facing projection of a failed record. Derived on demand, never
/// persisted separately.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRecordFailure {
    pub record_id: EntityId,
    pub external_id: Option<String>,
    pub created_at: Timestamp,
    pub processed_at: Option<Timestamp>,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn pending_record() -> ImportRecord {
        ImportRecord::pending(new_entity_id(), br#"{"title":"Dune"}"#.to_vec(), None, t0())
    }

    #[test]
    fn pending_record_digest_matches_payload() {
        let record = pending_record();
        assert_eq!(record.status, RecordStatus::Pending);
        assert_eq!(record.digest, ContentDigest::of(&record.payload));
        assert!(record.error.is_none());
        assert!(record.processed_at.is_none());
    }

    #[test]
    fn complete_transitions_once() {
        let mut record = pending_record();
        record.complete(t0()).unwrap();
        assert_eq!(record.status, RecordStatus::Completed);
        assert!(record.error.is_none());
        assert!(record.processed_at.is_some());

        let err = record.complete(t0()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn fail_records_message() {
        let mut record = pending_record();
        record.fail("bad row", t0()).unwrap();
        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("bad row"));
    }

    #[test]
    fn fail_after_complete_is_invalid_state() {
        let mut record = pending_record();
        record.complete(t0()).unwrap();
        assert!(record.fail("too late", t0()).is_err());
    }

    #[test]
    fn error_present_iff_failed() {
        let mut completed = pending_record();
        completed.complete(t0()).unwrap();
        assert!(completed.error.is_none());

        let mut failed = pending_record();
        failed.fail("bad row", t0()).unwrap();
        assert!(failed.error.is_some());
    }

    #[test]
    fn failure_projection_only_for_failed_records() {
        let mut record = pending_record();
        assert!(record.failure_projection().is_none());

        record.fail("bad row", t0()).unwrap();
        let failure = record.failure_projection().unwrap();
        assert_eq!(failure.record_id, record.id);
        assert_eq!(failure.error, "bad row");
    }
}
