// Data-driven catalog configuration.
//
// Every tunable of a catalog build lives in `CatalogConfig`, loaded from
// JSON. The builders never use magic numbers; they read from the config.
// Missing fields fall back to `CatalogConfig::default()`, so a config file
// only needs to name what it changes.
//
// The config is split by concern when it feeds the stage cache: each stage
// hashes only the fields that change its result (see `pipeline.rs`), so
// toggling `force_*` or `cache_dir` never invalidates a cached stage.

use crate::error::{CatalogError, CatalogResult};
use lalia_grammar::DEFAULT_NODE_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Pages per aligned non-terminal pair.
    pub page_count: usize,
    /// Words in each pair's word pool.
    pub word_count: usize,
    /// Derivation depth limit when resolving page roots.
    pub max_page_generation_depth: usize,
    /// Derivation depth limit when resolving pairs inside a page.
    pub max_page_side_generation_depth: usize,
    /// Derivation depth limit when searching phoneme realizations of words.
    pub word_generation_depth: usize,
    /// Resolutions shorter than this are only used when nothing longer exists.
    pub minimal_resolution_length: usize,
    /// Largest number of pages in one combination.
    pub maximum_page_combination_count: usize,
    /// Combination keys need strictly more distinct orderings than this.
    pub minimal_page_combination_count: usize,
    /// Node budget per derivation tree.
    pub derivation_node_limit: usize,
    /// Where stage results are cached.
    pub cache_dir: PathBuf,
    /// Recompute the page catalog even if a cached result exists.
    pub force_page_catalog: bool,
    /// Recompute the combination catalog even if a cached result exists.
    pub force_page_combination_catalog: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            page_count: 3,
            word_count: 2,
            max_page_generation_depth: 8,
            max_page_side_generation_depth: 5,
            word_generation_depth: 3,
            minimal_resolution_length: 3,
            maximum_page_combination_count: 3,
            minimal_page_combination_count: 390,
            derivation_node_limit: DEFAULT_NODE_LIMIT,
            cache_dir: PathBuf::from("etc"),
            force_page_catalog: false,
            force_page_combination_catalog: false,
        }
    }
}

impl CatalogConfig {
    /// Parse a config from a JSON string. Absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject counts that would make a build meaningless.
    pub fn validate(&self) -> CatalogResult<()> {
        let counts = [
            ("page_count", self.page_count),
            ("word_count", self.word_count),
            ("maximum_page_combination_count", self.maximum_page_combination_count),
            ("derivation_node_limit", self.derivation_node_limit),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(CatalogError::inconsistency(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}
