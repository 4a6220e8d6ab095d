// Page catalog: pages for every aligned non-terminal pair of a language.
//
// The catalog maps each aligned pair `(consonant[i], vowel[i])` to
// `page_count` pages. `PageCatalogBuilder` prepares everything pages are
// made of before building any page:
// 1. root resolutions for the aligned pairs, searched to
//    `max_page_generation_depth`;
// 2. interior resolutions for every pair of
//    `(consonant non-terminals + unison) x (vowel non-terminals + unison)`,
//    searched to the shallower `max_page_side_generation_depth` (aligned
//    pairs reuse their root resolutions);
// 3. a pool of `word_count` words for every interior pair.
// `PageBuilder` then assembles the pages from those tables.
//
// A language whose grammars have different numbers of non-terminals has no
// aligned pairs to speak of and is rejected before any search starts.
//
// Pages are addressed by `PageRef` (pair + variant index); combination
// catalogs store references instead of page copies.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::page::PageBuilder;
use crate::pair::{PairResolution, PairResolver};
use lalia_grammar::Pitch;
use lalia_lang::{
    DurationRange, LanguageDefinition, LanguageStructure, NonTerminalPair, Page, Word,
    WordGenerator,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One page of a catalog: the pair it realizes and its variant index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub pair: NonTerminalPair,
    pub variant: usize,
}

impl PageRef {
    pub fn new(pair: NonTerminalPair, variant: usize) -> Self {
        PageRef { pair, variant }
    }
}

/// Pages per aligned pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageCatalog {
    entries: BTreeMap<NonTerminalPair, Vec<Page>>,
}

/// Totals over the pages of one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageCatalogEntrySummary {
    pub pair: NonTerminalPair,
    pub pages: usize,
    pub paragraphs: usize,
    pub sentences: usize,
    pub words: usize,
    pub phonemes: usize,
    /// Summed duration of all pages, rests between them excluded.
    pub duration: DurationRange,
}

impl PageCatalog {
    pub fn new(entries: BTreeMap<NonTerminalPair, Vec<Page>>) -> Self {
        PageCatalog { entries }
    }

    pub fn get(&self, pair: &NonTerminalPair) -> Option<&[Page]> {
        self.entries.get(pair).map(Vec::as_slice)
    }

    pub fn page(&self, page: &PageRef) -> Option<&Page> {
        self.entries.get(&page.pair)?.get(page.variant)
    }

    /// Every page of the catalog, addressed by reference.
    pub fn page_refs(&self) -> impl Iterator<Item = PageRef> + '_ {
        self.entries.iter().flat_map(|(pair, pages)| {
            (0..pages.len()).map(move |variant| PageRef::new(pair.clone(), variant))
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &NonTerminalPair> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NonTerminalPair, &[Page])> {
        self.entries.iter().map(|(pair, pages)| (pair, pages.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Vec<PageCatalogEntrySummary> {
        self.entries
            .iter()
            .map(|(pair, pages)| {
                let mut summary = PageCatalogEntrySummary {
                    pair: pair.clone(),
                    pages: pages.len(),
                    paragraphs: 0,
                    sentences: 0,
                    words: 0,
                    phonemes: 0,
                    duration: DurationRange::ZERO,
                };
                for page in pages {
                    let stats = page.stats();
                    summary.paragraphs += stats.paragraphs;
                    summary.sentences += stats.sentences;
                    summary.words += stats.words;
                    summary.phonemes += stats.phonemes;
                    summary.duration += page.duration();
                }
                summary
            })
            .collect()
    }
}

/// Builds a `PageCatalog` from a language definition.
#[derive(Debug, Clone, Copy)]
pub struct PageCatalogBuilder<'a> {
    definition: &'a LanguageDefinition,
    config: &'a CatalogConfig,
}

impl<'a> PageCatalogBuilder<'a> {
    pub fn new(definition: &'a LanguageDefinition, config: &'a CatalogConfig) -> Self {
        PageCatalogBuilder { definition, config }
    }

    /// `page_count` pages for every aligned pair, drawing on pools of
    /// `word_count` words.
    pub fn build(&self, page_count: usize, word_count: usize) -> CatalogResult<PageCatalog> {
        self.check_consistency(page_count, word_count)?;
        let config = self.config;
        let resolver = PairResolver::new(self.definition)
            .with_minimal_length(config.minimal_resolution_length)
            .with_node_limit(config.derivation_node_limit);

        let main_pairs = self.definition.aligned_pairs();
        info!(
            pairs = main_pairs.len(),
            page_count, word_count, "building page catalog"
        );

        let mut resolutions: BTreeMap<NonTerminalPair, Vec<PairResolution>> = BTreeMap::new();
        for pair in &main_pairs {
            let roots = resolver.resolve_pair(pair, page_count, config.max_page_generation_depth)?;
            resolutions.insert(pair.clone(), roots);
        }

        let generator = WordGenerator::new(self.definition, config.word_generation_depth)
            .with_node_limit(config.derivation_node_limit);
        let interior = self.interior_pairs();
        let mut words: BTreeMap<NonTerminalPair, Vec<Word>> = BTreeMap::new();
        for pair in &interior {
            if !resolutions.contains_key(pair) {
                let side = resolver.resolve_pair(pair, page_count, config.max_page_side_generation_depth)?;
                resolutions.insert(pair.clone(), side);
            }
            words.insert(pair.clone(), generator.words(pair, word_count)?);
        }
        info!(
            resolved = resolutions.len(),
            word_pools = words.len(),
            "prepared page material"
        );

        let mut builder = PageBuilder::new(&resolutions, &words);
        let mut entries = BTreeMap::new();
        for pair in &main_pairs {
            let pages = builder.build(pair)?;
            debug!(pair = %pair, pages = pages.len(), "built pages");
            entries.insert(pair.clone(), pages);
        }

        let catalog = PageCatalog::new(entries);
        info!(entries = catalog.len(), "page catalog built");
        Ok(catalog)
    }

    fn check_consistency(&self, page_count: usize, word_count: usize) -> CatalogResult<()> {
        let consonants = self.definition.consonant_grammar.non_terminals().len();
        let vowels = self.definition.vowel_grammar.non_terminals().len();
        if consonants != vowels {
            return Err(CatalogError::inconsistency(format!(
                "consonant grammar has {consonants} non-terminals but vowel grammar has {vowels}"
            )));
        }
        if page_count == 0 || word_count == 0 {
            return Err(CatalogError::inconsistency(format!(
                "page_count ({page_count}) and word_count ({word_count}) must be at least 1"
            )));
        }
        Ok(())
    }

    /// `(consonant non-terminals + unison) x (vowel non-terminals + unison)`,
    /// unison first on each side.
    fn interior_pairs(&self) -> Vec<NonTerminalPair> {
        let with_unison = |symbols: &[Pitch]| -> Vec<Pitch> {
            std::iter::once(Pitch::unison())
                .chain(symbols.iter().cloned())
                .collect()
        };
        let consonants = with_unison(self.definition.consonant_grammar.non_terminals());
        let vowels = with_unison(self.definition.vowel_grammar.non_terminals());
        consonants
            .iter()
            .flat_map(|consonant| {
                vowels
                    .iter()
                    .map(move |vowel| NonTerminalPair::new(consonant.clone(), vowel.clone()))
            })
            .collect()
    }
}
