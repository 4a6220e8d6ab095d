// Grammar resolver: expands a symbol into an exact number of resolutions.
//
// A resolution is a sequence of non-terminals whose sum equals the resolved
// symbol. The resolver grows a `Derivation` from `(symbol)` level by level
// and collects every node made only of non-terminals (the root included).
// Growth stops as soon as `variation_count` candidates of at least
// `minimal_length` symbols exist, at `depth_limit`, or when the tree cannot
// grow any more (exhausted or out of node budget).
//
// The candidates are then trimmed or padded by `selector::reduce()`, and
// every returned resolution is re-checked against the pitch-sum invariant.
//
// Failure modes:
// - no candidate at all: `GrammarError::ExhaustedSearch`, listing the rules
//   that apply to the symbol;
// - fewer eligible candidates than requested (counting only those of at
//   least `minimal_length` symbols when any exist): the result repeats
//   candidates cyclically and a `warn!` reports the reduced diversity;
// - node budget hit: a `warn!`, and the candidates found so far are used.

use crate::derivation::Derivation;
use crate::error::{GrammarError, GrammarResult};
use crate::grammar::{Grammar, join_pitches};
use crate::pitch::Pitch;
use crate::selector;
use tracing::{debug, warn};

/// Ordered sequence of non-terminals summing to the symbol it resolves.
pub type Resolution = Vec<Pitch>;

/// Default cap on derivation tree nodes per search.
pub const DEFAULT_NODE_LIMIT: usize = 200_000;

/// Bounded, deterministic resolution search over one grammar.
#[derive(Debug, Clone, Copy)]
pub struct GrammarResolver<'g> {
    grammar: &'g Grammar,
    minimal_length: usize,
    node_limit: usize,
}

impl<'g> GrammarResolver<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        GrammarResolver {
            grammar,
            minimal_length: 1,
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }

    /// Prefer resolutions of at least this many symbols.
    pub fn with_minimal_length(mut self, minimal_length: usize) -> Self {
        self.minimal_length = minimal_length;
        self
    }

    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// All distinct all-non-terminal derivations of `symbol` found by the
    /// bounded search, in breadth-first order.
    pub fn candidates(
        &self,
        symbol: &Pitch,
        variation_count: usize,
        depth_limit: usize,
    ) -> Vec<Resolution> {
        let grammar = self.grammar;
        let minimal_length = self.minimal_length;
        let is_candidate = |symbols: &[Pitch]| symbols.iter().all(|s| grammar.is_non_terminal(s));

        let mut derivation = Derivation::new(grammar, symbol.clone(), self.node_limit);
        derivation.grow_until(depth_limit, |tree| {
            tree.sequences_where(|symbols| {
                symbols.len() >= minimal_length && is_candidate(symbols)
            })
            .count()
                >= variation_count
        });
        if derivation.is_truncated() {
            warn!(
                symbol = %symbol,
                node_limit = self.node_limit,
                depth = derivation.depth(),
                "derivation node budget exhausted; using candidates found so far"
            );
        }

        let candidates: Vec<Resolution> = derivation
            .sequences_where(is_candidate)
            .map(<[Pitch]>::to_vec)
            .collect();
        debug!(
            symbol = %symbol,
            depth = derivation.depth(),
            nodes = derivation.nodes().len(),
            candidates = candidates.len(),
            "derivation search finished"
        );
        candidates
    }

    /// Exactly `variation_count` resolutions of `symbol`.
    pub fn resolve(
        &self,
        symbol: &Pitch,
        variation_count: usize,
        depth_limit: usize,
    ) -> GrammarResult<Vec<Resolution>> {
        let candidates = self.candidates(symbol, variation_count, depth_limit);
        if candidates.is_empty() {
            return Err(self.exhausted(symbol, depth_limit));
        }
        let eligible = selector::eligible_count(&candidates, self.minimal_length);
        if eligible < variation_count {
            warn!(
                symbol = %symbol,
                found = eligible,
                candidates = candidates.len(),
                minimal_length = self.minimal_length,
                requested = variation_count,
                "reduced diversity: repeating resolutions"
            );
        }

        let resolutions = selector::reduce(candidates, variation_count, self.minimal_length);
        for resolution in &resolutions {
            verify_resolution(symbol, resolution)?;
        }
        Ok(resolutions)
    }

    fn exhausted(&self, symbol: &Pitch, depth_limit: usize) -> GrammarError {
        GrammarError::ExhaustedSearch {
            symbol: symbol.clone(),
            depth_limit,
            rules: self
                .grammar
                .rules_for(symbol)
                .map(|rule| rule.to_string())
                .collect(),
        }
    }
}

/// Check that `resolution` sums back to `origin`.
pub fn verify_resolution(origin: &Pitch, resolution: &[Pitch]) -> GrammarResult<()> {
    let sum: Pitch = resolution.iter().sum();
    if &sum == origin {
        Ok(())
    } else {
        Err(GrammarError::ResolutionSumMismatch {
            origin: origin.clone(),
            sum,
            resolution: join_pitches(resolution),
        })
    }
}
