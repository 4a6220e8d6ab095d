// Errors raised while loading a language definition or generating words.

use crate::types::{NonTerminalPair, PhonemeKind};
use lalia_grammar::{GrammarError, Pitch};

pub type LangResult<T> = Result<T, LangError>;

#[derive(thiserror::Error, Debug)]
pub enum LangError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("phoneme '{xsampa}' is listed twice among the {kind:?} phonemes")]
    DuplicatePhoneme { xsampa: String, kind: PhonemeKind },

    #[error("phoneme '{xsampa}' cannot be mapped to the unison")]
    UnisonPhoneme { xsampa: String },

    /// A grammar symbol that words must realize has no phoneme sequence.
    #[error("no {kind:?} phoneme realization of {symbol} for pair {pair}")]
    MissingPhoneme {
        pair: NonTerminalPair,
        kind: PhonemeKind,
        symbol: Pitch,
    },

    #[error("language definition JSON: {0}")]
    Json(#[from] serde_json::Error),
}
