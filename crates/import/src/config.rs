//! Processor configuration.

use shelfmark_core::import::DEFAULT_MAX_PAYLOAD_BYTES;

use crate::merge::MergeStrategy;

/// Knobs for one processor instance. Applies to every batch it runs.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Per-payload size ceiling. Oversized payloads become per-record
    /// failures ("payload too large"), never batch aborts.
    pub max_payload_bytes: usize,
    /// How candidates are matched against existing catalog items.
    pub merge_strategy: MergeStrategy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            merge_strategy: MergeStrategy::ExternalId,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ImportConfig::default();
        assert_eq!(config.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
        assert_eq!(config.merge_strategy, MergeStrategy::ExternalId);
    }
}
