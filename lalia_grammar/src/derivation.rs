// Breadth-first derivation trees over a `Grammar`.
//
// A `Derivation` starts from a single-symbol sequence and grows one level per
// `grow()` call. A child of a node is obtained by replacing exactly one
// expandable symbol occurrence (any position) with the right side of one of
// its rules. Every sequence is inserted into the tree at most once: a `seen`
// set deduplicates across the whole tree, so identical sequences reached
// through different rewrite orders are expanded only once.
//
// Nodes are stored in a flat arena (`Vec<DerivationNode>`) in insertion
// order, which is breadth-first order. The frontier is the index range of
// the last level. Insertion order is fully determined by the grammar's rule
// order, so two derivations of the same symbol are identical.
//
// Growth is bounded by a node budget. When the budget is hit mid-level the
// tree is marked truncated and stops growing; the caller decides whether
// that is worth a warning.
//
// Consumers:
// - `resolver.rs`: all-non-terminal nodes are resolution candidates.
// - `lalia_lang::words`: nodes whose every symbol has a phoneme are word
//   realizations.

use crate::grammar::Grammar;
use crate::pitch::Pitch;
use rustc_hash::FxHashSet;
use std::ops::Range;

/// One node of a derivation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationNode {
    pub symbols: Vec<Pitch>,
    /// Arena index of the node this one was rewritten from.
    pub parent: Option<usize>,
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct Derivation<'g> {
    grammar: &'g Grammar,
    nodes: Vec<DerivationNode>,
    seen: FxHashSet<Vec<Pitch>>,
    frontier: Range<usize>,
    depth: usize,
    node_limit: usize,
    truncated: bool,
}

impl<'g> Derivation<'g> {
    /// A tree holding only the root sequence `(start)`.
    pub fn new(grammar: &'g Grammar, start: Pitch, node_limit: usize) -> Self {
        let root = vec![start];
        let mut seen = FxHashSet::default();
        seen.insert(root.clone());
        Derivation {
            grammar,
            nodes: vec![DerivationNode {
                symbols: root,
                parent: None,
                depth: 0,
            }],
            seen,
            frontier: 0..1,
            depth: 0,
            node_limit: node_limit.max(1),
            truncated: false,
        }
    }

    /// Add one level of children. Returns `false` when nothing was added,
    /// either because the frontier had no expandable symbol left or because
    /// the node budget was already exhausted.
    pub fn grow(&mut self) -> bool {
        if self.truncated || self.frontier.is_empty() {
            return false;
        }
        let grammar = self.grammar;
        let level_start = self.nodes.len();
        'frontier: for parent in self.frontier.clone() {
            for position in 0..self.nodes[parent].symbols.len() {
                let symbol = &self.nodes[parent].symbols[position];
                for rule in grammar.rules_for(symbol) {
                    if self.nodes.len() >= self.node_limit {
                        self.truncated = true;
                        break 'frontier;
                    }
                    let symbols = &self.nodes[parent].symbols;
                    let mut child = Vec::with_capacity(symbols.len() + rule.right.len() - 1);
                    child.extend_from_slice(&symbols[..position]);
                    child.extend_from_slice(&rule.right);
                    child.extend_from_slice(&symbols[position + 1..]);
                    if !self.seen.insert(child.clone()) {
                        continue;
                    }
                    self.nodes.push(DerivationNode {
                        symbols: child,
                        parent: Some(parent),
                        depth: self.depth + 1,
                    });
                }
            }
        }
        self.frontier = level_start..self.nodes.len();
        if self.frontier.is_empty() {
            return false;
        }
        self.depth += 1;
        true
    }

    /// Grow level by level until `is_enough` holds, `depth_limit` levels
    /// exist, or the tree stops growing.
    pub fn grow_until(&mut self, depth_limit: usize, mut is_enough: impl FnMut(&Self) -> bool) {
        while self.depth < depth_limit && !is_enough(self) {
            if !self.grow() {
                break;
            }
        }
    }

    /// All nodes in breadth-first insertion order.
    pub fn nodes(&self) -> &[DerivationNode] {
        &self.nodes
    }

    /// Number of completed levels below the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the node budget cut growth short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Sequences of the nodes matching `accept`, in insertion order.
    pub fn sequences_where<'a>(
        &'a self,
        mut accept: impl FnMut(&[Pitch]) -> bool + 'a,
    ) -> impl Iterator<Item = &'a [Pitch]> + 'a {
        self.nodes
            .iter()
            .map(|node| node.symbols.as_slice())
            .filter(move |symbols| accept(symbols))
    }
}
