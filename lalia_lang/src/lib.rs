// The lalia language: phonemes, nested language structures, and words.
//
// Provides the phonetic side of the lalia engine. A `LanguageDefinition`
// bundles the two grammars (consonants carry time, vowels carry pitch) and
// the phoneme table that realizes their symbols. `lalia_catalog` builds
// pages out of it; this crate only knows how single words and structures
// look, not how pages are assembled.
//
// Architecture:
// - `types.rs`: `PhonemeKind`, `Phoneme`, `NonTerminalPair`, `DurationRange`
// - `phonemes.rs`: `PhonemeTable`, bidirectional phoneme/pitch lookups
// - `structure.rs`: `PhonemeGroup`, `Word`, `Nested` (Sentence, Paragraph,
//   Page), and the `LanguageStructure` trait
// - `words.rs`: `WordGenerator`, pair -> words
// - `error.rs`: `LangError`
// - `lib.rs` (this file): `LanguageDefinition` and the embedded default
//
// The definition is loaded from `data/lalia_language.json` via
// `LanguageDefinition::from_json()` (JSON string in, typed struct out). The
// `default_language()` convenience function uses `include_str!` to embed the
// default definition at compile time.
//
// Determinism constraint: everything here is a pure function of the
// definition. No RNG, no hash-order iteration.

pub mod error;
pub mod phonemes;
pub mod structure;
pub mod types;
pub mod words;

// Re-export key types at crate root for convenience.
pub use error::{LangError, LangResult};
pub use phonemes::{PhonemeEntry, PhonemeTable};
pub use structure::{
    LanguageStructure, Level, Nested, Page, PageStats, Paragraph, PhonemeGroup, Sentence, Word,
};
pub use types::{DurationRange, NonTerminalPair, Phoneme, PhonemeKind};
pub use words::WordGenerator;

use lalia_grammar::Grammar;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Grammars and phonemes of one lalia language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    /// Time grammar, realized by consonants.
    pub consonant_grammar: Grammar,
    /// Pitch grammar, realized by vowels.
    pub vowel_grammar: Grammar,
    pub phonemes: PhonemeTable,
}

impl LanguageDefinition {
    /// Parse a definition from a JSON string.
    pub fn from_json(json: &str) -> LangResult<Self> {
        let definition: LanguageDefinition = serde_json::from_str(json)?;
        definition.warn_unmapped_symbols();
        definition.warn_unused_phonemes();
        Ok(definition)
    }

    /// The grammar realized by phonemes of `kind`.
    pub fn grammar(&self, kind: PhonemeKind) -> &Grammar {
        match kind {
            PhonemeKind::Consonant => &self.consonant_grammar,
            PhonemeKind::Vowel => &self.vowel_grammar,
        }
    }

    /// `(consonant[i], vowel[i])` for the two grammars' non-terminals in
    /// declaration order. Stops at the shorter list; callers that need the
    /// counts to match check that first.
    pub fn aligned_pairs(&self) -> Vec<NonTerminalPair> {
        self.consonant_grammar
            .non_terminals()
            .iter()
            .zip(self.vowel_grammar.non_terminals())
            .map(|(consonant, vowel)| NonTerminalPair::new(consonant.clone(), vowel.clone()))
            .collect()
    }

    /// Grammar symbols without a phoneme only limit word generation, so they
    /// are reported rather than rejected.
    fn warn_unmapped_symbols(&self) {
        for kind in [PhonemeKind::Consonant, PhonemeKind::Vowel] {
            let grammar = self.grammar(kind);
            let unmapped: Vec<String> = grammar
                .non_terminals()
                .iter()
                .chain(grammar.terminals())
                .filter(|symbol| !self.phonemes.has_phoneme(kind, symbol))
                .map(|symbol| symbol.to_string())
                .collect();
            if !unmapped.is_empty() {
                warn!(?kind, symbols = %unmapped.join(", "), "grammar symbols without phonemes");
            }
        }
    }

    /// Phonemes whose pitch is outside the grammar's alphabet are never
    /// generated.
    fn warn_unused_phonemes(&self) {
        for kind in [PhonemeKind::Consonant, PhonemeKind::Vowel] {
            let grammar = self.grammar(kind);
            let unused: Vec<&str> = self
                .phonemes
                .phonemes(kind)
                .filter(|(_, pitch)| grammar.kind(pitch).is_none())
                .map(|(phoneme, _)| phoneme.xsampa.as_str())
                .collect();
            if !unused.is_empty() {
                warn!(?kind, phonemes = %unused.join(", "), "phonemes outside the grammar alphabet");
            }
        }
    }
}

/// Load the default language definition embedded at compile time.
///
/// Uses `include_str!` to embed `data/lalia_language.json`. Panics if
/// the embedded JSON is malformed (should never happen in a released build).
pub fn default_language() -> LanguageDefinition {
    let json = include_str!("../../data/lalia_language.json");
    LanguageDefinition::from_json(json).expect("embedded lalia_language.json should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language_loads() {
        let language = default_language();
        assert_eq!(language.consonant_grammar.non_terminals().len(), 6);
        assert_eq!(language.vowel_grammar.non_terminals().len(), 6);
        assert_eq!(language.phonemes.phonemes(PhonemeKind::Consonant).count(), 12);
        assert_eq!(language.phonemes.phonemes(PhonemeKind::Vowel).count(), 15);
    }

    #[test]
    fn test_default_language_maps_every_symbol() {
        let language = default_language();
        for kind in [PhonemeKind::Consonant, PhonemeKind::Vowel] {
            let grammar = language.grammar(kind);
            for symbol in grammar.non_terminals().iter().chain(grammar.terminals()) {
                assert!(language.phonemes.has_phoneme(kind, symbol), "{kind:?} {symbol}");
            }
        }
    }

    #[test]
    fn test_every_default_non_terminal_has_a_non_terminal_split() {
        let language = default_language();
        for kind in [PhonemeKind::Consonant, PhonemeKind::Vowel] {
            let grammar = language.grammar(kind);
            for symbol in grammar.non_terminals() {
                let splits = grammar
                    .rules_for(symbol)
                    .filter(|rule| rule.right.iter().all(|s| grammar.is_non_terminal(s)))
                    .count();
                assert!(splits >= 2, "{kind:?} {symbol} has {splits} splits");
            }
        }
    }

    #[test]
    fn test_aligned_pairs() {
        let language = default_language();
        let pairs = language.aligned_pairs();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0].consonant.to_string(), "3/2");
        assert_eq!(pairs[0].vowel.to_string(), "3/2");
        assert_eq!(pairs[2].consonant.to_string(), "7/4");
        assert_eq!(pairs[2].vowel.to_string(), "5/4");
    }

    #[test]
    fn test_definition_json_roundtrip() {
        let language = default_language();
        let json = serde_json::to_string(&language).unwrap();
        let reread = LanguageDefinition::from_json(&json).unwrap();
        assert_eq!(language, reread);
    }

    #[test]
    fn test_malformed_definition_is_a_json_error() {
        let err = LanguageDefinition::from_json("{\"consonant_grammar\": 3}").unwrap_err();
        assert!(matches!(err, LangError::Json(_)));
        assert!(err.to_string().starts_with("language definition JSON"));

        let language = default_language();
        let mut value = serde_json::to_value(&language).unwrap();
        let first = value["phonemes"]["vowels"][0]["xsampa"].clone();
        value["phonemes"]["vowels"][1]["xsampa"] = first;
        let err = LanguageDefinition::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, LangError::Json(_)));
        assert!(err.to_string().contains("listed twice"), "{err}");
    }
}
