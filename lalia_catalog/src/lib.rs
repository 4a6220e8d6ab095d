// Page and page-combination catalogs for the lalia language.
//
// Top of the lalia stack. Takes a `LanguageDefinition` (from `lalia_lang`)
// and produces:
// - a `PageCatalog`: pages for every aligned (consonant, vowel)
//   non-terminal pair, each page a balanced expansion of its pair down to
//   words;
// - a `PageCombinationCatalog`: orderings of catalog pages grouped by their
//   summed pair, kept only for sums with enough distinct orderings.
//
// Architecture:
// - `pair.rs`: `PairResolver`, pair -> balanced pair resolutions
// - `page.rs`: `PageBuilder`, resolutions + word pools -> pages
// - `page_catalog.rs`: `PageCatalogBuilder`, `PageCatalog`, `PageRef`
// - `combination.rs`: `CombinationCatalogBuilder`, `PageCombinationCatalog`
// - `config.rs`: `CatalogConfig`, every tunable of a build
// - `cache.rs`: content-addressed JSON cache for stage results
// - `pipeline.rs`: `build_catalogs()`, both stages through the cache
// - `error.rs`: `CatalogError`
//
// Determinism constraint: a build is a pure function of the definition and
// the config. Round-robin cursors and ordered maps replace any randomness
// or hash-order iteration, so cached and fresh results are identical.

pub mod cache;
pub mod combination;
pub mod config;
pub mod error;
pub mod page;
pub mod page_catalog;
pub mod pair;
pub mod pipeline;

pub use cache::{cached, stage_digest, stage_path};
pub use combination::{CombinationCatalogBuilder, PageCombination, PageCombinationCatalog};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use page::PageBuilder;
pub use page_catalog::{PageCatalog, PageCatalogBuilder, PageCatalogEntrySummary, PageRef};
pub use pair::{PairResolution, PairResolver, balance, verify_pair_resolution};
pub use pipeline::{
    Catalogs, PAGE_CATALOG_STAGE, PAGE_COMBINATION_CATALOG_STAGE, build_catalogs,
    build_catalogs_uncached,
};
