//! Import batch and record statuses, per-record outcomes, and validation.
//!
//! Provides:
//! - Status enums with string conversions for batches and records
//! - The per-record outcome type the processor accumulates
//! - Source-name validation and payload size limits

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a source name (e.g. "csv-upload").
pub const MAX_SOURCE_NAME_LENGTH: usize = 128;

/// Maximum length of an original file name recorded on a batch.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Default per-payload size ceiling (1 MiB). Oversized payloads become
/// per-record failures, never batch aborts.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// Batch status
// ---------------------------------------------------------------------------

/// Status of an import batch.
///
/// A batch is `Failed` only when the batch-level operation itself aborted
/// before every record was attempted. A batch in which every record was
/// attempted — even if some failed — is `Completed`; per-record failures are
/// surfaced through the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Completed,
    Failed,
}

impl BatchStatus {
    /// Return the status name as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether no further transition can occur from this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["pending", "completed", "failed"];
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record status
// ---------------------------------------------------------------------------

/// Status of a single record within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether no further transition can occur from this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub const ALL: &'static [&'static str] = &["pending", "completed", "failed"];
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record outcome
// ---------------------------------------------------------------------------

/// Outcome of processing one payload, carried as data rather than control
/// flow so the aggregate summary survives partial failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Parsed and merged into the catalog.
    Completed,
    /// Parse or merge failed; the message is persisted on the record.
    Failed(String),
    /// Byte-identical payload already seen in this batch; no record created,
    /// no status change.
    Duplicate,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
            Self::Duplicate => "duplicate",
        }
    }
}

impl std::fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a source name (free text describing origin, e.g. "csv-upload").
pub fn validate_source_name(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("Source name cannot be empty".to_string());
    }
    if source.len() > MAX_SOURCE_NAME_LENGTH {
        return Err(format!(
            "Source name exceeds maximum length of {MAX_SOURCE_NAME_LENGTH} characters"
        ));
    }
    if source.contains('\0') {
        return Err("Source name contains null bytes".to_string());
    }
    Ok(())
}

/// Validate an optional original file name recorded on a batch.
pub fn validate_file_name(file_name: &str) -> Result<(), String> {
    if file_name.is_empty() {
        return Err("File name cannot be empty".to_string());
    }
    if file_name.len() > MAX_FILE_NAME_LENGTH {
        return Err(format!(
            "File name exceeds maximum length of {MAX_FILE_NAME_LENGTH} characters"
        ));
    }
    if file_name.contains('/') || file_name.contains('\0') {
        return Err("File name must not contain path separators or null bytes".to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
