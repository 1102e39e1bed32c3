/// All entity identifiers are UUIDv7, so they sort by creation time.
pub type EntityId = uuid::Uuid;

/// Tenant scope for catalog data. Every lookup is household-scoped.
pub type HouseholdId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh time-ordered identifier.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::now_v7()
}
