// Catalog pipeline: page catalog, then combination catalog, both cached.
//
// Each stage is keyed by exactly the inputs that change its result. The
// page stage hashes the language definition plus the page-related config
// fields; the combination stage hashes the page key plus its own two
// fields. Paths, force flags and other bookkeeping stay out of the keys, so
// moving the cache or forcing a rebuild never changes a digest.

use crate::cache::cached;
use crate::combination::{CombinationCatalogBuilder, PageCombinationCatalog};
use crate::config::CatalogConfig;
use crate::error::CatalogResult;
use crate::page_catalog::{PageCatalog, PageCatalogBuilder};
use lalia_lang::LanguageDefinition;
use serde::Serialize;
use tracing::info;

pub const PAGE_CATALOG_STAGE: &str = "page_catalog";
pub const PAGE_COMBINATION_CATALOG_STAGE: &str = "page_combination_catalog";

/// Both catalogs of one build.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogs {
    pub pages: PageCatalog,
    pub combinations: PageCombinationCatalog,
}

#[derive(Serialize)]
struct PageStageKey<'a> {
    definition: &'a LanguageDefinition,
    page_count: usize,
    word_count: usize,
    max_page_generation_depth: usize,
    max_page_side_generation_depth: usize,
    word_generation_depth: usize,
    minimal_resolution_length: usize,
    derivation_node_limit: usize,
}

impl<'a> PageStageKey<'a> {
    fn new(definition: &'a LanguageDefinition, config: &CatalogConfig) -> Self {
        PageStageKey {
            definition,
            page_count: config.page_count,
            word_count: config.word_count,
            max_page_generation_depth: config.max_page_generation_depth,
            max_page_side_generation_depth: config.max_page_side_generation_depth,
            word_generation_depth: config.word_generation_depth,
            minimal_resolution_length: config.minimal_resolution_length,
            derivation_node_limit: config.derivation_node_limit,
        }
    }
}

#[derive(Serialize)]
struct CombinationStageKey<'a> {
    pages: &'a PageStageKey<'a>,
    maximum_page_combination_count: usize,
    minimal_page_combination_count: usize,
}

/// Build both catalogs, reusing cached stage results under
/// `config.cache_dir` where the inputs match.
pub fn build_catalogs(
    definition: &LanguageDefinition,
    config: &CatalogConfig,
) -> CatalogResult<Catalogs> {
    config.validate()?;
    let page_key = PageStageKey::new(definition, config);
    let pages: PageCatalog = cached(
        &config.cache_dir,
        PAGE_CATALOG_STAGE,
        &page_key,
        config.force_page_catalog,
        || build_page_catalog(definition, config),
    )?;

    let combination_key = CombinationStageKey {
        pages: &page_key,
        maximum_page_combination_count: config.maximum_page_combination_count,
        minimal_page_combination_count: config.minimal_page_combination_count,
    };
    let combinations: PageCombinationCatalog = cached(
        &config.cache_dir,
        PAGE_COMBINATION_CATALOG_STAGE,
        &combination_key,
        config.force_page_combination_catalog,
        || CombinationCatalogBuilder::from_config(config).build(&pages),
    )?;

    info!(
        pages = pages.len(),
        combinations = combinations.len(),
        "catalogs ready"
    );
    Ok(Catalogs {
        pages,
        combinations,
    })
}

/// Build both catalogs without touching the disk.
pub fn build_catalogs_uncached(
    definition: &LanguageDefinition,
    config: &CatalogConfig,
) -> CatalogResult<Catalogs> {
    config.validate()?;
    let pages = build_page_catalog(definition, config)?;
    let combinations = CombinationCatalogBuilder::from_config(config).build(&pages)?;
    Ok(Catalogs {
        pages,
        combinations,
    })
}

fn build_page_catalog(
    definition: &LanguageDefinition,
    config: &CatalogConfig,
) -> CatalogResult<PageCatalog> {
    PageCatalogBuilder::new(definition, config).build(config.page_count, config.word_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::stage_path;
    use lalia_lang::default_language;

    #[test]
    fn test_keys_ignore_bookkeeping_fields() {
        let language = default_language();
        let config = CatalogConfig::default();
        let moved = CatalogConfig {
            cache_dir: "/elsewhere".into(),
            force_page_catalog: true,
            force_page_combination_catalog: true,
            ..config.clone()
        };
        let dir = std::path::Path::new("cache");
        let a = stage_path(dir, PAGE_CATALOG_STAGE, &PageStageKey::new(&language, &config)).unwrap();
        let b = stage_path(dir, PAGE_CATALOG_STAGE, &PageStageKey::new(&language, &moved)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_combination_key_follows_page_key() {
        let language = default_language();
        let config = CatalogConfig::default();
        let more_words = CatalogConfig {
            word_count: 3,
            ..config.clone()
        };
        let dir = std::path::Path::new("cache");
        let key = |config: &CatalogConfig| {
            let pages = PageStageKey::new(&language, config);
            let combination = CombinationStageKey {
                pages: &pages,
                maximum_page_combination_count: config.maximum_page_combination_count,
                minimal_page_combination_count: config.minimal_page_combination_count,
            };
            stage_path(dir, PAGE_COMBINATION_CATALOG_STAGE, &combination).unwrap()
        };
        assert_ne!(key(&config), key(&more_words));
    }
}
