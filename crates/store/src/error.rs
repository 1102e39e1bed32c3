use shelfmark_core::types::EntityId;

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. `(batch_id, digest)`).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// The backend itself failed (connection, I/O, serialization).
    #[error("Storage backend error: {0}")]
    Backend(String),
}
