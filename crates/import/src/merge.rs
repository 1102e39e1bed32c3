//! Candidate-to-catalog merge resolution.
//!
//! A parsed candidate either inserts a new catalog item or patch-merges into
//! exactly one existing item. An ambiguous match (multiple items share the
//! match key) is a merge conflict the strategy cannot resolve — it becomes a
//! per-record failure, same as a parse failure.

use serde::{Deserialize, Serialize};
use shelfmark_core::item::ItemCandidate;
use shelfmark_core::types::{HouseholdId, Timestamp};
use shelfmark_store::models::CatalogItem;
use shelfmark_store::{CatalogStore, StoreError};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How a candidate is matched against existing items. Matching is always
/// scoped to the batch's household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Match solely on the source system's external id; candidates without
    /// one always insert.
    ExternalId,
    /// Match on external id first, falling back to an exact title match.
    ExternalIdThenTitle,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalId => "external_id",
            Self::ExternalIdThenTitle => "external_id_then_title",
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the merge did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// No existing item matched; a new one was inserted.
    Created,
    /// Exactly one item matched; specified fields were patched onto it.
    Updated,
}

/// Why a single candidate's merge failed. Absorbed into that record's
/// persisted failure message; never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The match key is ambiguous: multiple existing items share it.
    #[error("Merge conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Reduce a match set to at most one target, treating multiples as conflicts.
fn resolve_unique(
    matches: Vec<CatalogItem>,
    key_kind: &str,
    key: &str,
) -> Result<Option<CatalogItem>, MergeError> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.into_iter().next()),
        n => Err(MergeError::Conflict(format!(
            "{n} items match {key_kind} '{key}'"
        ))),
    }
}

/// Find the item a candidate should merge into, per the strategy.
/// `Ok(None)` means "insert a new item".
async fn resolve_target(
    catalog: &dyn CatalogStore,
    household_id: HouseholdId,
    candidate: &ItemCandidate,
    strategy: MergeStrategy,
) -> Result<Option<CatalogItem>, MergeError> {
    if let Some(external_id) = candidate.external_id.as_deref() {
        let matches = catalog.find_by_external_id(household_id, external_id).await?;
        if let Some(target) = resolve_unique(matches, "external id", external_id)? {
            return Ok(Some(target));
        }
    }

    if strategy == MergeStrategy::ExternalIdThenTitle {
        let matches = catalog.find_by_title(household_id, &candidate.title).await?;
        return resolve_unique(matches, "title", &candidate.title);
    }

    Ok(None)
}

/// Merge a candidate into the catalog: insert when nothing matches,
/// otherwise patch only the fields the candidate specified.
pub async fn apply_candidate(
    catalog: &dyn CatalogStore,
    household_id: HouseholdId,
    candidate: &ItemCandidate,
    strategy: MergeStrategy,
    now: Timestamp,
) -> Result<MergeAction, MergeError> {
    match resolve_target(catalog, household_id, candidate, strategy).await? {
        Some(mut target) => {
            target.apply_patch(&candidate.inventory, now);
            catalog.update_item(&target).await?;
            Ok(MergeAction::Updated)
        }
        None => {
            let item = CatalogItem::from_candidate(household_id, candidate, now);
            catalog.insert_item(item).await?;
            Ok(MergeAction::Created)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
