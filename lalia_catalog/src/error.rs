// Errors raised while building catalogs.
//
// Everything is fatal: a build either produces complete catalogs or stops
// with one of these. Lower-level grammar and language errors are wrapped
// unchanged.

use lalia_grammar::GrammarError;
use lalia_lang::{LangError, NonTerminalPair};
use std::path::PathBuf;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// Parameters or grammars that cannot work together.
    #[error("configuration inconsistency: {0}")]
    ConfigurationInconsistency(String),

    /// A page needed a pair nothing was prepared for.
    #[error("no catalog entry for pair {pair}; available pairs: [{}]", format_pairs(.available))]
    MissingCatalogEntry {
        pair: NonTerminalPair,
        available: Vec<NonTerminalPair>,
    },

    /// A pair resolution does not add up to the pair it resolves.
    #[error("pair resolution [{}] of {pair} sums to {sum}", format_pairs(.resolution))]
    PairSumMismatch {
        pair: NonTerminalPair,
        sum: NonTerminalPair,
        resolution: Vec<NonTerminalPair>,
    },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Lang(#[from] LangError),

    #[error("cache I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cache JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub fn inconsistency(message: impl Into<String>) -> Self {
        CatalogError::ConfigurationInconsistency(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CatalogError::Json {
            path: path.into(),
            source,
        }
    }
}

fn format_pairs(pairs: &[NonTerminalPair]) -> String {
    pairs
        .iter()
        .map(|pair| pair.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
