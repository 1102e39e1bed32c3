//! Payload sources: the lazy, finite, consume-once input of a batch run.
//!
//! An upstream ingestion adapter (CSV/JSON parser, HTTP upload handler)
//! produces payloads on demand. A single bad payload is a per-record
//! failure; the stream itself erroring is a [`SourceReadError`] and is fatal
//! to the batch.

use futures::stream::{self, BoxStream, StreamExt};

/// One externally-sourced record: raw bytes plus the source system's own
/// identifier, if it supplied one.
#[derive(Debug, Clone)]
pub struct RawPayload {
    /// Raw payload bytes as received (typically UTF-8 JSON). Hashed as-is:
    /// byte-different but semantically equal payloads are distinct records.
    pub bytes: Vec<u8>,
    /// Identifier assigned by the source system.
    pub external_id: Option<String>,
}

impl RawPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            external_id: None,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// The payload sequence breaking mid-iteration (upstream I/O failure),
/// distinct from a single malformed payload.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Source read failure: {0}")]
pub struct SourceReadError(pub String);

impl SourceReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A finite, consume-once sequence of payloads. Not restartable.
pub type PayloadStream = BoxStream<'static, Result<RawPayload, SourceReadError>>;

/// Wrap an already-buffered batch of payloads as a stream.
pub fn payload_stream(payloads: Vec<RawPayload>) -> PayloadStream {
    stream::iter(payloads.into_iter().map(Ok)).boxed()
}
