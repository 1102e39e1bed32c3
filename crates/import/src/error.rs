use shelfmark_core::error::CoreError;
use shelfmark_store::StoreError;

use crate::source::SourceReadError;

/// Hard failures of the import path.
///
/// Per-record parse and merge failures are NOT represented here — they are
/// absorbed into the failed record's persisted error message so the batch
/// can complete and report. Only the failures below abort a call:
/// source-level breakage, batch/record lifecycle violations, and storage
/// failures outside a single record's merge.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The payload sequence itself broke mid-iteration.
    #[error(transparent)]
    Source(#[from] SourceReadError),

    /// The durable layer rejected a write, including an unexpected
    /// uniqueness-constraint hit on the records table (indicating a race).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Contract violation (e.g. terminating an already-terminal record or
    /// batch) or invalid input. Never silently ignored.
    #[error(transparent)]
    Core(#[from] CoreError),
}
