// Page combination catalog: orderings of pages grouped by their summed pair.
//
// For every combination size `1..=maximum`, every multiset of catalog keys
// (combination with replacement) is summed into its key. Each member then
// picks one page variant (cartesian product over the variants), and every
// distinct ordering of the chosen pages is a candidate for that key.
//
// Candidates are deduplicated per key by page content, not by reference:
// each page gets the id of the first structurally equal page in the
// catalog, and an ordering counts once per distinct id sequence. Keys whose
// distinct candidate count is not strictly greater than `minimal` are
// dropped, leaving only sums that can be voiced many different ways.
//
// Enumeration is fully deterministic: keys in catalog order, variants as an
// odometer, orderings in lexicographic order.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::page_catalog::{PageCatalog, PageRef};
use lalia_lang::{NonTerminalPair, Page};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// An ordered sequence of catalog pages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageCombination {
    pub pages: Vec<PageRef>,
}

impl PageCombination {
    pub fn new(pages: Vec<PageRef>) -> Self {
        PageCombination { pages }
    }

    /// Sum of the referenced pages' pairs.
    pub fn pair(&self) -> NonTerminalPair {
        self.pages.iter().map(|page| &page.pair).sum()
    }

    /// Resolve the references against `catalog`.
    pub fn pages<'c>(&self, catalog: &'c PageCatalog) -> CatalogResult<Vec<&'c Page>> {
        self.pages
            .iter()
            .map(|page| {
                catalog
                    .page(page)
                    .ok_or_else(|| CatalogError::MissingCatalogEntry {
                        pair: page.pair.clone(),
                        available: catalog.keys().cloned().collect(),
                    })
            })
            .collect()
    }
}

/// Distinct page orderings per summed pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCombinationCatalog {
    entries: BTreeMap<NonTerminalPair, Vec<PageCombination>>,
}

impl PageCombinationCatalog {
    pub fn get(&self, pair: &NonTerminalPair) -> Option<&[PageCombination]> {
        self.entries.get(pair).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &NonTerminalPair> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NonTerminalPair, &[PageCombination])> {
        self.entries
            .iter()
            .map(|(pair, combinations)| (pair, combinations.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationCatalogBuilder {
    /// Largest number of pages in one combination.
    pub maximum: usize,
    /// Keys need strictly more distinct orderings than this.
    pub minimal: usize,
}

impl CombinationCatalogBuilder {
    pub fn new(maximum: usize, minimal: usize) -> Self {
        CombinationCatalogBuilder { maximum, minimal }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        CombinationCatalogBuilder::new(
            config.maximum_page_combination_count,
            config.minimal_page_combination_count,
        )
    }

    pub fn build(&self, catalog: &PageCatalog) -> CatalogResult<PageCombinationCatalog> {
        let content_ids = content_ids(catalog);
        let keys: Vec<(&NonTerminalPair, usize)> = catalog
            .iter()
            .map(|(pair, pages)| (pair, pages.len()))
            .collect();
        info!(
            keys = keys.len(),
            maximum = self.maximum,
            minimal = self.minimal,
            "building page combination catalog"
        );

        let mut candidates: BTreeMap<NonTerminalPair, Vec<PageCombination>> = BTreeMap::new();
        let mut seen: FxHashMap<NonTerminalPair, FxHashSet<Vec<usize>>> = FxHashMap::default();
        for size in 1..=self.maximum {
            for members in combinations_with_replacement(keys.len(), size) {
                let pair: NonTerminalPair = members.iter().map(|&index| keys[index].0).sum();
                let variant_counts: Vec<usize> =
                    members.iter().map(|&index| keys[index].1).collect();
                let seen_ids = seen.entry(pair.clone()).or_default();
                let entry = candidates.entry(pair).or_default();

                for variants in Odometer::new(variant_counts) {
                    let mut pages: Vec<PageRef> = members
                        .iter()
                        .zip(&variants)
                        .map(|(&index, &variant)| PageRef::new(keys[index].0.clone(), variant))
                        .collect();
                    pages.sort();
                    loop {
                        let ids: Vec<usize> = pages.iter().map(|page| content_ids[page]).collect();
                        if seen_ids.insert(ids) {
                            entry.push(PageCombination::new(pages.clone()));
                        }
                        if !next_permutation(&mut pages) {
                            break;
                        }
                    }
                }
            }
            debug!(size, sums = candidates.len(), "enumerated combinations");
        }

        let total = candidates.len();
        let entries: BTreeMap<NonTerminalPair, Vec<PageCombination>> = candidates
            .into_iter()
            .filter(|(_, combinations)| combinations.len() > self.minimal)
            .collect();
        info!(
            sums = total,
            kept = entries.len(),
            "page combination catalog built"
        );
        Ok(PageCombinationCatalog { entries })
    }
}

/// Each page's id is the position (in catalog order) of the first page
/// with equal content.
fn content_ids(catalog: &PageCatalog) -> FxHashMap<PageRef, usize> {
    let mut distinct: Vec<&Page> = Vec::new();
    let mut ids = FxHashMap::default();
    for page_ref in catalog.page_refs() {
        let Some(page) = catalog.page(&page_ref) else {
            continue;
        };
        let id = match distinct.iter().position(|known| *known == page) {
            Some(id) => id,
            None => {
                distinct.push(page);
                distinct.len() - 1
            }
        };
        ids.insert(page_ref, id);
    }
    ids
}

/// Every non-decreasing index sequence of length `size` over `0..n`.
fn combinations_with_replacement(n: usize, size: usize) -> Vec<Vec<usize>> {
    let mut all = Vec::new();
    if n == 0 {
        return all;
    }
    let mut current = vec![0; size];
    loop {
        all.push(current.clone());
        // Rightmost position that can still grow.
        let Some(position) = current.iter().rposition(|&index| index + 1 < n) else {
            return all;
        };
        let next = current[position] + 1;
        for index in &mut current[position..] {
            *index = next;
        }
    }
}

/// Cartesian product of `0..counts[i]`, last position fastest.
struct Odometer {
    counts: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl Odometer {
    fn new(counts: Vec<usize>) -> Self {
        let current = if counts.contains(&0) {
            None
        } else {
            Some(vec![0; counts.len()])
        };
        Odometer { counts, current }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let item = self.current.take()?;
        let mut next = item.clone();
        for position in (0..next.len()).rev() {
            next[position] += 1;
            if next[position] < self.counts[position] {
                self.current = Some(next);
                return Some(item);
            }
            next[position] = 0;
        }
        Some(item)
    }
}

/// Advance `items` to the next lexicographic permutation. Returns false
/// (leaving `items` sorted ascending) after the last one, so a sorted start
/// visits each distinct ordering exactly once.
fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|pair| pair[0] < pair[1]) else {
        items.reverse();
        return false;
    };
    let Some(successor) = items.iter().rposition(|item| *item > items[pivot]) else {
        return false;
    };
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}
