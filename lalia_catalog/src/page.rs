// Page builder: turns pair resolutions and word pools into pages.
//
// A page is built top-down from one root pair resolution:
//   Page      <- root resolution (one paragraph per pair)
//   Paragraph <- resolution of the paragraph's pair (one sentence per pair)
//   Sentence  <- resolution of the sentence's pair (one word per pair)
//   Word      <- next word from the pair's word pool
//
// Resolution choice for a non-root pair:
// 1. if the pair was already expanded on this page, reuse that expansion
//    (the per-page memo, seeded with the page's own root pair);
// 2. otherwise take the next resolution from the pair's round-robin cursor
//    and remember it for the rest of the page.
// Cursors (resolution and word) belong to the builder and keep advancing
// across pages and across `build()` calls, so consecutive pages vary while
// the whole build stays deterministic.
//
// A pair with no prepared resolutions or words is fatal
// (`CatalogError::MissingCatalogEntry`, listing what is available).

use crate::error::{CatalogError, CatalogResult};
use crate::pair::PairResolution;
use lalia_lang::{NonTerminalPair, Page, Paragraph, Sentence, Word};
use std::collections::BTreeMap;

/// Expansions chosen so far on the page being built.
type PageMemo = BTreeMap<NonTerminalPair, PairResolution>;

pub struct PageBuilder<'a> {
    resolutions: &'a BTreeMap<NonTerminalPair, Vec<PairResolution>>,
    words: &'a BTreeMap<NonTerminalPair, Vec<Word>>,
    resolution_cursors: BTreeMap<NonTerminalPair, usize>,
    word_cursors: BTreeMap<NonTerminalPair, usize>,
}

impl<'a> PageBuilder<'a> {
    pub fn new(
        resolutions: &'a BTreeMap<NonTerminalPair, Vec<PairResolution>>,
        words: &'a BTreeMap<NonTerminalPair, Vec<Word>>,
    ) -> Self {
        PageBuilder {
            resolutions,
            words,
            resolution_cursors: BTreeMap::new(),
            word_cursors: BTreeMap::new(),
        }
    }

    /// One page per root resolution of `pair`.
    pub fn build(&mut self, pair: &NonTerminalPair) -> CatalogResult<Vec<Page>> {
        let roots = self
            .resolutions
            .get(pair)
            .filter(|roots| !roots.is_empty())
            .ok_or_else(|| missing(pair, self.resolutions))?;

        roots
            .iter()
            .map(|root| {
                let mut memo = PageMemo::new();
                memo.insert(pair.clone(), root.clone());
                self.page(root, &mut memo)
            })
            .collect()
    }

    fn page(&mut self, root: &[NonTerminalPair], memo: &mut PageMemo) -> CatalogResult<Page> {
        let mut paragraphs = Vec::with_capacity(root.len());
        for pair in root {
            paragraphs.push(self.paragraph(pair, memo)?);
        }
        Ok(Page::page(paragraphs))
    }

    fn paragraph(&mut self, pair: &NonTerminalPair, memo: &mut PageMemo) -> CatalogResult<Paragraph> {
        let resolution = self.expand(pair, memo)?;
        let mut sentences = Vec::with_capacity(resolution.len());
        for child in &resolution {
            sentences.push(self.sentence(child, memo)?);
        }
        Ok(Paragraph::paragraph(sentences))
    }

    fn sentence(&mut self, pair: &NonTerminalPair, memo: &mut PageMemo) -> CatalogResult<Sentence> {
        let resolution = self.expand(pair, memo)?;
        let mut words = Vec::with_capacity(resolution.len());
        for child in &resolution {
            words.push(self.word(child)?);
        }
        Ok(Sentence::sentence(words))
    }

    fn word(&mut self, pair: &NonTerminalPair) -> CatalogResult<Word> {
        next_round_robin(self.words, &mut self.word_cursors, pair)
    }

    fn expand(&mut self, pair: &NonTerminalPair, memo: &mut PageMemo) -> CatalogResult<PairResolution> {
        if let Some(resolution) = memo.get(pair) {
            return Ok(resolution.clone());
        }
        let resolution = next_round_robin(self.resolutions, &mut self.resolution_cursors, pair)?;
        memo.insert(pair.clone(), resolution.clone());
        Ok(resolution)
    }
}

/// The next item of `pair`'s pool, advancing its cursor cyclically.
fn next_round_robin<T: Clone>(
    pools: &BTreeMap<NonTerminalPair, Vec<T>>,
    cursors: &mut BTreeMap<NonTerminalPair, usize>,
    pair: &NonTerminalPair,
) -> CatalogResult<T> {
    let pool = pools
        .get(pair)
        .filter(|pool| !pool.is_empty())
        .ok_or_else(|| missing(pair, pools))?;
    let cursor = cursors.entry(pair.clone()).or_insert(0);
    let item = pool[*cursor % pool.len()].clone();
    *cursor = (*cursor + 1) % pool.len();
    Ok(item)
}

fn missing<T>(pair: &NonTerminalPair, pools: &BTreeMap<NonTerminalPair, Vec<T>>) -> CatalogError {
    CatalogError::MissingCatalogEntry {
        pair: pair.clone(),
        available: pools.keys().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::verify_pair_resolution;
    use lalia_grammar::Pitch;
    use lalia_lang::{LanguageStructure, Phoneme, PhonemeGroup};

    fn p(text: &str) -> Pitch {
        text.parse().unwrap()
    }

    fn pair(c: &str, v: &str) -> NonTerminalPair {
        NonTerminalPair::new(p(c), p(v))
    }

    fn word(phoneme: Phoneme, pitch: &str) -> Word {
        Word::new(vec![PhonemeGroup::single(phoneme, p(pitch))])
    }

    /// Pairs of each sentence in a paragraph, read back from its words.
    fn sentence_pairs(paragraph: &Paragraph) -> Vec<NonTerminalPair> {
        paragraph
            .children
            .iter()
            .map(LanguageStructure::non_terminal_pair)
            .collect()
    }

    fn root() -> NonTerminalPair {
        pair("9/4", "9/4")
    }

    fn x() -> NonTerminalPair {
        pair("1/1", "3/2")
    }

    fn y() -> NonTerminalPair {
        pair("3/2", "1/1")
    }

    /// Root R = A + A = A + X + Y, where A = X + Y. X is realized by the
    /// vowel words "a" and "o", Y by the consonant word "t", all at 3/2.
    fn fixture() -> (
        BTreeMap<NonTerminalPair, Vec<PairResolution>>,
        BTreeMap<NonTerminalPair, Vec<Word>>,
    ) {
        let a = pair("3/2", "3/2");
        let mut resolutions = BTreeMap::new();
        resolutions.insert(root(), vec![vec![a.clone(), a.clone()], vec![a.clone(), x(), y()]]);
        resolutions.insert(a, vec![vec![x(), y()], vec![y(), x()]]);
        resolutions.insert(x(), vec![vec![x()]]);
        resolutions.insert(y(), vec![vec![y()]]);
        let mut words = BTreeMap::new();
        words.insert(x(), vec![word(Phoneme::vowel("a"), "3/2"), word(Phoneme::vowel("o"), "3/2")]);
        words.insert(y(), vec![word(Phoneme::consonant("t"), "3/2")]);
        (resolutions, words)
    }

    #[test]
    fn test_fixture_resolutions_are_balanced() {
        let (resolutions, words) = fixture();
        for (pair, options) in &resolutions {
            for resolution in options {
                verify_pair_resolution(pair, resolution).unwrap();
            }
        }
        for (pair, pool) in &words {
            assert!(pool.iter().all(|word| &word.non_terminal_pair() == pair));
        }
    }

    #[test]
    fn test_one_page_per_root_resolution() {
        let (resolutions, words) = fixture();
        let mut builder = PageBuilder::new(&resolutions, &words);
        let pages = builder.build(&root()).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].children.len(), 2);
        assert_eq!(pages[1].children.len(), 3);
        for page in &pages {
            assert_eq!(page.non_terminal_pair(), root());
        }
    }

    #[test]
    fn test_memo_repeats_expansions_within_a_page() {
        let (resolutions, words) = fixture();
        let mut builder = PageBuilder::new(&resolutions, &words);
        let pages = builder.build(&root()).unwrap();
        // Page one is [A, A]: both paragraphs share A's memoized expansion.
        let first = &pages[0];
        assert_eq!(sentence_pairs(&first.children[0]), vec![x(), y()]);
        assert_eq!(sentence_pairs(&first.children[0]), sentence_pairs(&first.children[1]));
    }

    #[test]
    fn test_cursors_advance_across_pages() {
        let (resolutions, words) = fixture();
        let mut builder = PageBuilder::new(&resolutions, &words);
        let pages = builder.build(&root()).unwrap();
        // A's first expansion [X, Y] went to page one, so page two gets [Y, X].
        assert_eq!(sentence_pairs(&pages[1].children[0]), vec![y(), x()]);
        // X's words alternate between "a" and "o" across the whole build.
        let text: Vec<String> = pages.iter().map(|page| page.as_xsampa_text()).collect();
        assert_eq!(text, vec!["a. t.\n\no. t.", "t. a.\n\no.\n\nt."]);
    }

    #[test]
    fn test_missing_pair_lists_available_pairs() {
        let (resolutions, words) = fixture();
        let mut builder = PageBuilder::new(&resolutions, &words);
        let err = builder.build(&pair("7/4", "7/4")).unwrap_err();
        match err {
            CatalogError::MissingCatalogEntry { pair: missing, available } => {
                assert_eq!(missing, pair("7/4", "7/4"));
                assert_eq!(available.len(), 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_word_pool_is_reported() {
        let (resolutions, mut words) = fixture();
        words.remove(&y());
        let mut builder = PageBuilder::new(&resolutions, &words);
        let err = builder.build(&root()).unwrap_err();
        match err {
            CatalogError::MissingCatalogEntry { pair, available } => {
                assert_eq!(pair, y());
                assert_eq!(available, vec![x()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
