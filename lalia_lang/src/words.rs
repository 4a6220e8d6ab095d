// Word generator: realizes a non-terminal pair as pronounceable words.
//
// Each side of the pair is expanded with its own grammar into phoneme
// sequences: derivation nodes (up to `depth` levels) in which every symbol
// has a phoneme on that side. The realizations found are trimmed or padded
// to `word_count` with the shared resolution selector (minimal length 1),
// so the i-th word uses the i-th consonant and the i-th vowel realization.
// A unison side is silent and contributes no phonemes.
//
// Consonant and vowel phonemes are merged by Euclidean interlocking,
// consonants first, giving one single-phoneme `PhonemeGroup` per phoneme.
// Because every derivation sums back to its root, every generated word
// realizes exactly the pair it was generated for.
//
// Used by `lalia_catalog` to fill the per-pair word pools pages draw from.
// Depends on `lib.rs` for `LanguageDefinition` and `structure.rs` for
// `Word`/`PhonemeGroup`.

use crate::LanguageDefinition;
use crate::error::{LangError, LangResult};
use crate::structure::{PhonemeGroup, Word};
use crate::types::{NonTerminalPair, PhonemeKind};
use lalia_grammar::{DEFAULT_NODE_LIMIT, Derivation, Pitch, interlock, reduce, verify_resolution};
use tracing::debug;

/// Generates words for non-terminal pairs of one language.
#[derive(Debug, Clone, Copy)]
pub struct WordGenerator<'a> {
    definition: &'a LanguageDefinition,
    depth: usize,
    node_limit: usize,
}

impl<'a> WordGenerator<'a> {
    /// A generator searching realizations up to `depth` derivation levels.
    pub fn new(definition: &'a LanguageDefinition, depth: usize) -> Self {
        WordGenerator {
            definition,
            depth,
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }

    pub fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Exactly `word_count` words realizing `pair`.
    pub fn words(&self, pair: &NonTerminalPair, word_count: usize) -> LangResult<Vec<Word>> {
        let consonants = self.realizations(pair, PhonemeKind::Consonant, word_count)?;
        let vowels = self.realizations(pair, PhonemeKind::Vowel, word_count)?;

        let words: Vec<Word> = consonants
            .into_iter()
            .zip(vowels)
            .map(|(consonant_groups, vowel_groups)| {
                Word::new(interlock(&[&consonant_groups[..], &vowel_groups[..]]))
            })
            .collect();
        debug!(pair = %pair, words = words.len(), "generated words");
        Ok(words)
    }

    /// `word_count` phoneme group sequences realizing one side of `pair`.
    fn realizations(
        &self,
        pair: &NonTerminalPair,
        kind: PhonemeKind,
        word_count: usize,
    ) -> LangResult<Vec<Vec<PhonemeGroup>>> {
        let symbol = pair.side(kind);
        if symbol.is_unison() {
            return Ok(vec![Vec::new(); word_count]);
        }

        let table = &self.definition.phonemes;
        let realizable =
            |symbols: &[Pitch]| symbols.iter().all(|s| table.has_phoneme(kind, s));

        let grammar = self.definition.grammar(kind);
        let mut derivation = Derivation::new(grammar, symbol.clone(), self.node_limit);
        derivation.grow_until(self.depth, |tree| {
            tree.sequences_where(realizable).count() >= word_count
        });
        let found: Vec<Vec<Pitch>> = derivation
            .sequences_where(realizable)
            .map(<[Pitch]>::to_vec)
            .collect();
        if found.is_empty() {
            return Err(LangError::MissingPhoneme {
                pair: pair.clone(),
                kind,
                symbol: symbol.clone(),
            });
        }

        reduce(found, word_count, 1)
            .into_iter()
            .map(|sequence| {
                verify_resolution(symbol, &sequence)?;
                self.phoneme_groups(pair, kind, sequence)
            })
            .collect()
    }

    /// One single-phoneme group per pitch, using canonical phonemes.
    fn phoneme_groups(
        &self,
        pair: &NonTerminalPair,
        kind: PhonemeKind,
        sequence: Vec<Pitch>,
    ) -> LangResult<Vec<PhonemeGroup>> {
        let mut groups = Vec::with_capacity(sequence.len());
        for pitch in sequence {
            let Some(phoneme) = self.definition.phonemes.phoneme_for(kind, &pitch) else {
                return Err(LangError::MissingPhoneme {
                    pair: pair.clone(),
                    kind,
                    symbol: pitch,
                });
            };
            groups.push(PhonemeGroup::single(phoneme.clone(), pitch));
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonemes::{PhonemeEntry, PhonemeTable};
    use crate::structure::LanguageStructure;
    use lalia_grammar::Grammar;

    fn p(text: &str) -> Pitch {
        text.parse().unwrap()
    }

    /// Tiny language: consonant grammar over 7/4, vowel grammar over 5/4,
    /// with one phoneme per terminal only.
    fn tiny_language() -> LanguageDefinition {
        let consonant_grammar = Grammar::pitch_based(
            vec![p("49/16")],
            vec![p("7/4")],
        )
        .unwrap();
        let vowel_grammar = Grammar::pitch_based(vec![p("25/16")], vec![p("5/4")]).unwrap();
        let phonemes = PhonemeTable::new(
            vec![PhonemeEntry::new("t", p("7/4"))],
            vec![PhonemeEntry::new("o", p("5/4"))],
        )
        .unwrap();
        LanguageDefinition {
            consonant_grammar,
            vowel_grammar,
            phonemes,
        }
    }

    #[test]
    fn test_words_realize_their_pair() {
        let language = tiny_language();
        let generator = WordGenerator::new(&language, 2);
        let pair = NonTerminalPair::new(p("49/16"), p("25/16"));
        let words = generator.words(&pair, 2).unwrap();
        assert_eq!(words.len(), 2);
        for word in &words {
            assert_eq!(word.non_terminal_pair(), pair);
            assert_eq!(word.xsampa(), "toto");
        }
    }

    #[test]
    fn test_unison_side_is_silent() {
        let language = tiny_language();
        let generator = WordGenerator::new(&language, 2);
        let pair = NonTerminalPair::new(Pitch::unison(), p("25/16"));
        let words = generator.words(&pair, 3).unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(|w| w.xsampa() == "oo"));

        let silent = generator.words(&NonTerminalPair::identity(), 1).unwrap();
        assert!(silent[0].groups.is_empty());
    }

    #[test]
    fn test_sum_mismatch_surfaces_as_grammar_error() {
        let err: LangError = verify_resolution(&p("49/16"), &[p("7/4")])
            .unwrap_err()
            .into();
        assert!(matches!(err, LangError::Grammar(_)));
        assert!(err.to_string().contains("49/16"), "{err}");
    }

    #[test]
    fn test_unrealizable_side_is_an_error() {
        let language = tiny_language();
        let generator = WordGenerator::new(&language, 0);
        // At depth 0 the root 49/16 has no phoneme of its own.
        let pair = NonTerminalPair::new(p("49/16"), Pitch::unison());
        let err = generator.words(&pair, 1).unwrap_err();
        assert!(matches!(
            err,
            LangError::MissingPhoneme {
                kind: PhonemeKind::Consonant,
                ..
            }
        ));
    }
}
