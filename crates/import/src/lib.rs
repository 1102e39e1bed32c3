//! Bulk import orchestration for the shelfmark catalog.
//!
//! The processor drives one batch end-to-end: it deduplicates payloads by
//! content digest, merges each into the catalog via patch-based partial
//! updates, records per-record outcomes as data, and finalizes the batch.
//! Per-record failures never abort a batch; only source-level and
//! batch-lifecycle failures propagate as errors. The reporter projects
//! terminal state into summaries and failure lists for operators.

pub mod config;
pub mod error;
pub mod merge;
pub mod processor;
pub mod reporter;
pub mod source;

pub use config::ImportConfig;
pub use error::ImportError;
pub use merge::{MergeAction, MergeStrategy};
pub use processor::{ImportProcessor, RunReport, RunStats};
pub use reporter::{BatchSummary, ImportReporter};
pub use source::{payload_stream, PayloadStream, RawPayload, SourceReadError};
