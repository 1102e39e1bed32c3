//! The batch orchestrator.
//!
//! Drives one import batch end-to-end: opens it, ingests each payload with
//! content-digest dedup, parses and merges records into the catalog, records
//! per-record outcomes, and finalizes the batch. Processing within a batch is
//! strictly sequential — the `(batch_id, digest)` check-then-insert must not
//! interleave — while distinct batches may run concurrently on independent
//! processors sharing only the durable stores.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use shelfmark_core::clock::Clock;
use shelfmark_core::hashing::ContentDigest;
use shelfmark_core::import::{
    validate_file_name, validate_source_name, BatchStatus, RecordOutcome,
};
use shelfmark_core::item::parse_candidate;
use shelfmark_core::types::HouseholdId;
use shelfmark_store::models::{ImportBatch, ImportRecord};
use shelfmark_store::{BlobStore, CatalogStore, ImportStore};

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::merge::{apply_candidate, MergeAction};
use crate::source::{RawPayload, SourceReadError};

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Counters observed by one run. Duplicate skips exist only here — they
/// never persist a record, so storage-derived summaries cannot see them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub completed: usize,
    pub failed: usize,
    pub duplicates_skipped: usize,
    /// The run stopped between payloads on a cancellation signal; the batch
    /// was left Pending for later reconciliation.
    pub cancelled: bool,
}

/// The result of driving one batch.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub batch: ImportBatch,
    pub stats: RunStats,
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Orchestrates import batches against the storage capabilities.
pub struct ImportProcessor {
    imports: Arc<dyn ImportStore>,
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
    config: ImportConfig,
    archive: Option<Arc<dyn BlobStore>>,
}

impl ImportProcessor {
    pub fn new(
        imports: Arc<dyn ImportStore>,
        catalog: Arc<dyn CatalogStore>,
        clock: Arc<dyn Clock>,
        config: ImportConfig,
    ) -> Self {
        Self {
            imports,
            catalog,
            clock,
            config,
            archive: None,
        }
    }

    /// Archive uploaded source documents to this blob store. Optional; plays
    /// no part in hashing or dedup.
    pub fn with_archive(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.archive = Some(blobs);
        self
    }

    // -- batch lifecycle ----------------------------------------------------

    /// Create and persist a Pending batch, stamping the start time.
    pub async fn open_batch(
        &self,
        household_id: HouseholdId,
        source: &str,
        file_name: Option<String>,
    ) -> Result<ImportBatch, ImportError> {
        validate_source_name(source)
            .map_err(shelfmark_core::error::CoreError::Validation)?;
        if let Some(ref name) = file_name {
            validate_file_name(name).map_err(shelfmark_core::error::CoreError::Validation)?;
        }

        let batch = ImportBatch::open(household_id, source, file_name, self.clock.now());
        self.imports.insert_batch(batch.clone()).await?;

        tracing::info!(
            batch_id = %batch.id,
            household_id = %batch.household_id,
            source = %batch.source,
            "Import batch opened"
        );
        Ok(batch)
    }

    /// Ingest one payload into the batch.
    ///
    /// Computes the content digest and looks the record up by
    /// `(batch_id, digest)`. A hit returns the existing record with
    /// `is_duplicate = true` and does no further work — re-submission within
    /// a batch is a no-op, not an error. A miss persists a new Pending
    /// record. An unexpected uniqueness rejection on insert indicates a race
    /// and propagates as a hard storage error.
    pub async fn ingest_payload(
        &self,
        batch: &ImportBatch,
        payload: RawPayload,
    ) -> Result<(ImportRecord, bool), ImportError> {
        let digest = ContentDigest::of(&payload.bytes);
        if let Some(existing) = self.imports.find_record_by_digest(batch.id, digest).await? {
            tracing::debug!(
                batch_id = %batch.id,
                record_id = %existing.id,
                digest = %digest,
                "Duplicate payload skipped"
            );
            return Ok((existing, true));
        }

        let record = ImportRecord::pending(
            batch.id,
            payload.bytes,
            payload.external_id,
            self.clock.now(),
        );
        self.imports.insert_record(record.clone()).await?;
        Ok((record, false))
    }

    /// Transition a Pending record to Completed and persist it. Calling this
    /// on an already-terminal record is a contract violation.
    pub async fn complete_record(&self, record: &mut ImportRecord) -> Result<(), ImportError> {
        record.complete(self.clock.now())?;
        self.imports.update_record(record).await?;
        Ok(())
    }

    /// Transition a Pending record to Failed with a human-readable message
    /// and persist it.
    pub async fn fail_record(
        &self,
        record: &mut ImportRecord,
        message: impl Into<String>,
    ) -> Result<(), ImportError> {
        let message = message.into();
        record.fail(message.clone(), self.clock.now())?;
        self.imports.update_record(record).await?;

        tracing::warn!(
            batch_id = %record.batch_id,
            record_id = %record.id,
            error = %message,
            "Import record failed"
        );
        Ok(())
    }

    /// Set the batch's terminal status and finish time, exactly once.
    pub async fn finalize_batch(
        &self,
        batch: &mut ImportBatch,
        status: BatchStatus,
    ) -> Result<(), ImportError> {
        batch.finalize(status, self.clock.now())?;
        self.imports.update_batch(batch).await?;

        tracing::info!(
            batch_id = %batch.id,
            status = %batch.status,
            "Import batch finalized"
        );
        Ok(())
    }

    /// Archive the original uploaded source document, if an archive store is
    /// configured. Returns the blob URL when archived.
    pub async fn archive_source(
        &self,
        batch: &ImportBatch,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<String>, ImportError> {
        let Some(ref blobs) = self.archive else {
            return Ok(None);
        };
        let file_name = batch.file_name.as_deref().unwrap_or("source");
        let path = format!("imports/{}/{}", batch.id, file_name);
        let url = blobs.upload(&path, bytes, content_type).await?;
        Ok(Some(url))
    }

    // -- orchestration --------------------------------------------------------

    /// Drive a batch end-to-end over a lazy payload sequence.
    ///
    /// Payloads are processed strictly in input order. A record's parse or
    /// merge failure never aborts the run; the loop continues to the next
    /// payload. A source read failure finalizes the batch as Failed
    /// immediately — records already processed keep their terminal state —
    /// and propagates. Cancellation is checked between payloads; a cancelled
    /// run leaves the batch Pending (abandoned), never silently retried.
    pub async fn run<S>(
        &self,
        household_id: HouseholdId,
        source: &str,
        file_name: Option<String>,
        mut payloads: S,
        cancel: &CancellationToken,
    ) -> Result<RunReport, ImportError>
    where
        S: Stream<Item = Result<RawPayload, SourceReadError>> + Send + Unpin,
    {
        let mut batch = self.open_batch(household_id, source, file_name).await?;
        let mut stats = RunStats::default();

        loop {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                tracing::info!(batch_id = %batch.id, "Import run cancelled between payloads");
                return Ok(RunReport { batch, stats });
            }

            let payload = match payloads.next().await {
                None => break,
                Some(Ok(payload)) => payload,
                Some(Err(source_err)) => {
                    self.finalize_batch(&mut batch, BatchStatus::Failed).await?;
                    return Err(source_err.into());
                }
            };

            match self.process_payload(&batch, payload).await? {
                RecordOutcome::Completed => stats.completed += 1,
                RecordOutcome::Failed(_) => stats.failed += 1,
                RecordOutcome::Duplicate => stats.duplicates_skipped += 1,
            }
        }

        // Every record was attempted: Completed even with per-record
        // failures. Failed is reserved for batch-level aborts.
        self.finalize_batch(&mut batch, BatchStatus::Completed).await?;
        Ok(RunReport { batch, stats })
    }

    /// Ingest and process one payload, returning its outcome as data.
    async fn process_payload(
        &self,
        batch: &ImportBatch,
        payload: RawPayload,
    ) -> Result<RecordOutcome, ImportError> {
        let oversized = payload.bytes.len() > self.config.max_payload_bytes;

        let (mut record, is_duplicate) = self.ingest_payload(batch, payload).await?;
        if is_duplicate {
            return Ok(RecordOutcome::Duplicate);
        }

        if oversized {
            let message = format!(
                "payload too large: {} bytes exceeds limit of {}",
                record.payload.len(),
                self.config.max_payload_bytes
            );
            self.fail_record(&mut record, message.clone()).await?;
            return Ok(RecordOutcome::Failed(message));
        }

        match self.merge_record(batch, &record).await {
            Ok(_action) => {
                self.complete_record(&mut record).await?;
                Ok(RecordOutcome::Completed)
            }
            Err(message) => {
                self.fail_record(&mut record, message.clone()).await?;
                Ok(RecordOutcome::Failed(message))
            }
        }
    }

    /// Parse the record's payload and merge it into the catalog. Any parse,
    /// conflict, or per-record storage failure comes back as the message to
    /// persist on the failed record.
    async fn merge_record(
        &self,
        batch: &ImportBatch,
        record: &ImportRecord,
    ) -> Result<MergeAction, String> {
        let candidate = parse_candidate(&record.payload).map_err(|e| e.to_string())?;
        apply_candidate(
            self.catalog.as_ref(),
            batch.household_id,
            &candidate,
            self.config.merge_strategy,
            self.clock.now(),
        )
        .await
        .map_err(|e| e.to_string())
    }
}
