// Pitch-based context-free grammars.
//
// A `Grammar` rewrites non-terminal pitches into sequences of pitches. Its
// defining property is that every rule is *pitch-based*: the right side adds
// up to the left side. Rewriting therefore never changes the sum of a
// sequence, which is what makes every derived resolution sum back to the
// symbol it came from.
//
// Two constructors:
// - `Grammar::new()` takes explicit rules and validates them.
// - `Grammar::pitch_based()` derives all binary rules from the alphabet: for
//   each non-terminal `N`, every ordered pair `(x, y)` of alphabet symbols
//   with `x + y == N` becomes `N -> [x, y]`.
//
// The unison is never part of the alphabet; it is the identity used to pad
// shorter resolutions and is treated as an implicit, rule-less non-terminal
// by `is_non_terminal()`.
//
// JSON form (see `data/lalia_language.json`): `non_terminals` and `terminals`
// as ratio strings, plus optional explicit `rules`. When `rules` is absent
// the grammar is derived with `pitch_based()`.

use crate::error::{GrammarError, GrammarResult};
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A rewrite rule `left -> right`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub left: Pitch,
    pub right: Vec<Pitch>,
}

impl Rule {
    pub fn new(left: Pitch, right: Vec<Pitch>) -> Self {
        Rule { left, right }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [{}]", self.left, join_pitches(&self.right))
    }
}

/// How a grammar classifies a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    NonTerminal,
    Terminal,
}

/// Serialized shape of a grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GrammarDef {
    non_terminals: Vec<Pitch>,
    terminals: Vec<Pitch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rules: Option<Vec<Rule>>,
}

/// An immutable, validated pitch-based grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GrammarDef", into = "GrammarDef")]
pub struct Grammar {
    non_terminals: Vec<Pitch>,
    terminals: Vec<Pitch>,
    rules: Vec<Rule>,
    /// Rule indices by left side, in declaration order.
    rule_index: BTreeMap<Pitch, Vec<usize>>,
}

impl Grammar {
    /// Build a grammar from explicit rules.
    pub fn new(
        non_terminals: Vec<Pitch>,
        terminals: Vec<Pitch>,
        rules: Vec<Rule>,
    ) -> GrammarResult<Self> {
        validate_alphabet(&non_terminals, &terminals)?;
        let non_terminal_set: BTreeSet<&Pitch> = non_terminals.iter().collect();
        let alphabet: BTreeSet<&Pitch> = non_terminals.iter().chain(&terminals).collect();

        for rule in &rules {
            if !non_terminal_set.contains(&rule.left) {
                return Err(GrammarError::UnknownSymbol {
                    rule: rule.to_string(),
                    symbol: rule.left.clone(),
                });
            }
            if let Some(symbol) = rule.right.iter().find(|s| !alphabet.contains(s)) {
                return Err(GrammarError::UnknownSymbol {
                    rule: rule.to_string(),
                    symbol: symbol.clone(),
                });
            }
            let sum: Pitch = rule.right.iter().sum();
            if sum != rule.left {
                return Err(GrammarError::RuleSumMismatch {
                    rule: rule.to_string(),
                    sum,
                });
            }
        }

        let mut rule_index: BTreeMap<Pitch, Vec<usize>> = BTreeMap::new();
        for (index, rule) in rules.iter().enumerate() {
            rule_index.entry(rule.left.clone()).or_default().push(index);
        }

        Ok(Grammar {
            non_terminals,
            terminals,
            rules,
            rule_index,
        })
    }

    /// Derive every binary pitch-based rule over the alphabet.
    ///
    /// Rules are generated in a fixed order (non-terminals in declaration
    /// order, then `x` and `y` in alphabet order: non-terminals first, then
    /// terminals), so the same alphabet always yields the same grammar.
    pub fn pitch_based(non_terminals: Vec<Pitch>, terminals: Vec<Pitch>) -> GrammarResult<Self> {
        validate_alphabet(&non_terminals, &terminals)?;
        let alphabet: Vec<&Pitch> = non_terminals.iter().chain(&terminals).collect();
        let mut rules = Vec::new();
        for left in &non_terminals {
            for &x in &alphabet {
                for &y in &alphabet {
                    if &(x + y) == left {
                        rules.push(Rule::new(left.clone(), vec![x.clone(), y.clone()]));
                    }
                }
            }
        }
        Grammar::new(non_terminals, terminals, rules)
    }

    /// Parse a grammar from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Non-terminals in declaration order.
    pub fn non_terminals(&self) -> &[Pitch] {
        &self.non_terminals
    }

    /// Terminals in declaration order.
    pub fn terminals(&self) -> &[Pitch] {
        &self.terminals
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules whose left side is `symbol`, in declaration order.
    pub fn rules_for<'a>(&'a self, symbol: &Pitch) -> impl Iterator<Item = &'a Rule> + use<'a> {
        self.rule_index
            .get(symbol)
            .into_iter()
            .flatten()
            .map(|&index| &self.rules[index])
    }

    /// `Some(kind)` for alphabet members, `None` for foreign pitches. The
    /// unison counts as a non-terminal.
    pub fn kind(&self, symbol: &Pitch) -> Option<SymbolKind> {
        if symbol.is_unison() || self.non_terminals.contains(symbol) {
            Some(SymbolKind::NonTerminal)
        } else if self.terminals.contains(symbol) {
            Some(SymbolKind::Terminal)
        } else {
            None
        }
    }

    pub fn is_non_terminal(&self, symbol: &Pitch) -> bool {
        self.kind(symbol) == Some(SymbolKind::NonTerminal)
    }

    pub fn is_terminal(&self, symbol: &Pitch) -> bool {
        self.kind(symbol) == Some(SymbolKind::Terminal)
    }
}

impl TryFrom<GrammarDef> for Grammar {
    type Error = GrammarError;

    fn try_from(def: GrammarDef) -> Result<Self, Self::Error> {
        match def.rules {
            Some(rules) => Grammar::new(def.non_terminals, def.terminals, rules),
            None => Grammar::pitch_based(def.non_terminals, def.terminals),
        }
    }
}

impl From<Grammar> for GrammarDef {
    fn from(grammar: Grammar) -> Self {
        GrammarDef {
            non_terminals: grammar.non_terminals,
            terminals: grammar.terminals,
            rules: Some(grammar.rules),
        }
    }
}

/// Format pitches as `a, b, c`.
pub fn join_pitches(pitches: &[Pitch]) -> String {
    pitches
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_alphabet(non_terminals: &[Pitch], terminals: &[Pitch]) -> GrammarResult<()> {
    if non_terminals.iter().chain(terminals).any(Pitch::is_unison) {
        return Err(GrammarError::UnisonInAlphabet);
    }
    if let Some(symbol) = terminals.iter().find(|t| non_terminals.contains(t)) {
        return Err(GrammarError::OverlappingSymbol {
            symbol: symbol.clone(),
        });
    }
    Ok(())
}
