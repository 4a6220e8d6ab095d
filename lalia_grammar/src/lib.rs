// Pitch grammars and bounded resolution search for the lalia language engine.
//
// Every lalia symbol is a just-intonation pitch. A grammar rewrites
// non-terminal pitches into sequences whose pitches add up to the rewritten
// symbol, so any derivation sums back to where it started. This crate holds
// that algebra and the search built on top of it; it knows nothing about
// phonemes or pages.
//
// Architecture:
// - `pitch.rs`: `Pitch`, prime-exponent ratios forming a monoid under `+`
// - `grammar.rs`: `Grammar` and `Rule`, validated at construction, with
//   explicit or pitch-based (derived) rule sets
// - `derivation.rs`: breadth-first, deduplicated derivation trees
// - `resolver.rs`: `GrammarResolver`, exact-count resolution search
// - `selector.rs`: `reduce()`, length-bucketed least-used trimming/padding,
//   and `eligible_count()`
// - `interlock.rs`: Euclidean interlocking of sequences
// - `error.rs`: `GrammarError`
//
// Determinism constraint: every search and selection here is a pure
// function of its inputs. There is no RNG; iteration orders come from rule
// declaration order and `BTreeMap` keys, never from hash order.

pub mod derivation;
pub mod error;
pub mod grammar;
pub mod interlock;
pub mod pitch;
pub mod resolver;
pub mod selector;

// Re-export key types at crate root for convenience.
pub use derivation::{Derivation, DerivationNode};
pub use error::{GrammarError, GrammarResult};
pub use grammar::{Grammar, Rule, SymbolKind};
pub use interlock::{interlock, pad_interlocked};
pub use pitch::Pitch;
pub use resolver::{DEFAULT_NODE_LIMIT, GrammarResolver, Resolution, verify_resolution};
pub use selector::{eligible_count, reduce};
