// Error taxonomy for grammar construction and resolution search.
//
// Every variant is fatal for a catalog build: grammars are static data and
// the search is deterministic, so a failure means the data or the parameters
// are unsatisfiable, not that a retry could succeed.

use crate::pitch::Pitch;

/// Convenience result type used across the grammar crate.
pub type GrammarResult<T> = Result<T, GrammarError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A ratio string could not be parsed into a pitch.
    #[error("invalid ratio '{0}'")]
    InvalidRatio(String),

    /// A pitch was declared both terminal and non-terminal.
    #[error("symbol {symbol} is declared both as terminal and as non-terminal")]
    OverlappingSymbol { symbol: Pitch },

    /// The unison is reserved as padding identity.
    #[error("unison (1/1) is the padding identity and cannot be declared as a grammar symbol")]
    UnisonInAlphabet,

    /// A rule mentions a pitch outside the grammar's alphabet, or its left
    /// side is not a non-terminal.
    #[error("rule {rule} uses {symbol}, which is not a valid symbol in that position")]
    UnknownSymbol { rule: String, symbol: Pitch },

    /// A rule's right side does not add up to its left side.
    #[error("rule {rule} sums to {sum} instead of its left side")]
    RuleSumMismatch { rule: String, sum: Pitch },

    /// No all-non-terminal derivation of the symbol exists within the limit.
    #[error(
        "no resolution of {symbol} found within depth {depth_limit}; rules for {symbol}: [{}]",
        .rules.join(", ")
    )]
    ExhaustedSearch {
        symbol: Pitch,
        depth_limit: usize,
        rules: Vec<String>,
    },

    /// Internal consistency violation: a produced resolution does not sum
    /// back to the symbol it was derived from.
    #[error("resolution [{resolution}] sums to {sum}, not to its origin {origin}")]
    ResolutionSumMismatch {
        origin: Pitch,
        sum: Pitch,
        resolution: String,
    },
}
