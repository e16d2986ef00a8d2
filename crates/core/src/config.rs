//! Ambient configuration for the indexing pipeline.
//!
//! The core pipeline (`SPEC_FULL.md` §1) takes no configuration of its
//! own - it is a pure function of `(parsed_file, tree, language)`. This
//! module exists for the handful of toggles that genuinely vary across
//! callers (whether to mine docstrings/JSDoc, how strict the column
//! convention check is in debug builds) without threading extra
//! parameters through every pass. Loaded the way the rest of the stack
//! loads configuration: a `serde`-deserializable struct with defaults,
//! optionally overridden from the environment via the `config` crate.

use serde::{Deserialize, Serialize};

/// Toggles for the indexing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Mine docstrings/JSDoc comments and attach them to definitions (§4.4.4).
    pub extract_documentation: bool,

    /// Extract JSDoc `@type`/`@returns` annotations for untyped JavaScript (§4.6).
    pub mine_jsdoc_types: bool,

    /// Assert scope-tree invariants (containment, no sibling overlap) after
    /// pass 2 completes. Off by default in release builds for speed; the
    /// pipeline's correctness does not depend on this running.
    pub verify_scope_invariants: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            extract_documentation: true,
            mine_jsdoc_types: true,
            verify_scope_invariants: cfg!(debug_assertions),
        }
    }
}

impl IndexerConfig {
    /// Loads configuration from the environment, falling back to defaults
    /// for anything unset. Environment variables are prefixed
    /// `CODESEARCH_INDEXER_`, e.g. `CODESEARCH_INDEXER_EXTRACT_DOCUMENTATION=false`.
    pub fn from_env() -> crate::error::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::Environment::with_prefix("CODESEARCH_INDEXER"));

        let loaded = builder
            .build()
            .map_err(|e| crate::error::Error::invalid_input(e.to_string()))?;

        match loaded.try_deserialize::<Self>() {
            Ok(cfg) => Ok(cfg),
            // No environment overrides present at all is not an error.
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_documentation_extraction() {
        let cfg = IndexerConfig::default();
        assert!(cfg.extract_documentation);
        assert!(cfg.mine_jsdoc_types);
    }
}
