// Pair resolver: resolves a (consonant, vowel) pair into balanced pair
// resolutions.
//
// Both sides are resolved independently with their own grammar
// (`GrammarResolver`, exact count, shared minimal length). Each side's
// resolutions are sorted by length (stable, so equal lengths keep selector
// order) and zipped positionally: the i-th shortest consonant resolution
// pairs with the i-th shortest vowel resolution.
//
// The two sides of a zipped pair usually differ in length. The shorter one
// is padded with unisons placed by Euclidean interlocking, so silence is
// spread evenly instead of piling up at one end. Padding is symmetric:
// whichever side is shorter gets the same treatment.
//
// Every pair resolution is checked to sum back to the resolved pair.

use crate::error::{CatalogError, CatalogResult};
use lalia_grammar::{DEFAULT_NODE_LIMIT, GrammarResolver, Pitch, Resolution, pad_interlocked};
use lalia_lang::{LanguageDefinition, NonTerminalPair, PhonemeKind};
use tracing::debug;

/// Ordered pairs summing (from the identity pair) to the resolved pair.
pub type PairResolution = Vec<NonTerminalPair>;

#[derive(Debug, Clone, Copy)]
pub struct PairResolver<'a> {
    definition: &'a LanguageDefinition,
    minimal_length: usize,
    node_limit: usize,
}

impl<'a> PairResolver<'a> {
    pub fn new(definition: &'a LanguageDefinition) -> Self {
        PairResolver {
            definition,
            minimal_length: 1,
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }

    pub fn with_minimal_length(mut self, minimal_length: usize) -> Self {
        self.minimal_length = minimal_length;
        self
    }

    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Exactly `variation_count` balanced resolutions of `pair`.
    pub fn resolve_pair(
        &self,
        pair: &NonTerminalPair,
        variation_count: usize,
        depth_limit: usize,
    ) -> CatalogResult<Vec<PairResolution>> {
        let consonants =
            self.resolve_side(PhonemeKind::Consonant, &pair.consonant, variation_count, depth_limit)?;
        let vowels = self.resolve_side(PhonemeKind::Vowel, &pair.vowel, variation_count, depth_limit)?;

        let resolutions: Vec<PairResolution> = consonants
            .into_iter()
            .zip(vowels)
            .map(|(consonant, vowel)| balance(&consonant, &vowel))
            .collect();
        for resolution in &resolutions {
            verify_pair_resolution(pair, resolution)?;
        }
        debug!(
            pair = %pair,
            lengths = ?resolutions.iter().map(Vec::len).collect::<Vec<_>>(),
            "resolved pair"
        );
        Ok(resolutions)
    }

    /// Resolutions of one side, shortest first.
    fn resolve_side(
        &self,
        kind: PhonemeKind,
        symbol: &Pitch,
        variation_count: usize,
        depth_limit: usize,
    ) -> CatalogResult<Vec<Resolution>> {
        let mut resolutions = GrammarResolver::new(self.definition.grammar(kind))
            .with_minimal_length(self.minimal_length)
            .with_node_limit(self.node_limit)
            .resolve(symbol, variation_count, depth_limit)?;
        resolutions.sort_by_key(Vec::len);
        Ok(resolutions)
    }
}

/// Zip two side resolutions, padding the shorter with interlocked unisons.
pub fn balance(consonants: &[Pitch], vowels: &[Pitch]) -> PairResolution {
    let length = consonants.len().max(vowels.len());
    let consonants = pad_interlocked(consonants, length, Pitch::unison());
    let vowels = pad_interlocked(vowels, length, Pitch::unison());
    consonants
        .into_iter()
        .zip(vowels)
        .map(|(consonant, vowel)| NonTerminalPair::new(consonant, vowel))
        .collect()
}

/// Check that `resolution` sums back to `pair`.
pub fn verify_pair_resolution(
    pair: &NonTerminalPair,
    resolution: &[NonTerminalPair],
) -> CatalogResult<()> {
    let sum: NonTerminalPair = resolution.iter().sum();
    if &sum == pair {
        Ok(())
    } else {
        Err(CatalogError::PairSumMismatch {
            pair: pair.clone(),
            sum,
            resolution: resolution.to_vec(),
        })
    }
}
