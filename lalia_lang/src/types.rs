// Core lalia language types: phonemes, non-terminal pairs, and duration ranges.
//
// The type hierarchy is:
// - `PhonemeKind`: consonant or vowel; decides which grammar a phoneme
//   belongs to (consonants carry time, vowels carry pitch)
// - `Phoneme`: an X-SAMPA code tagged with its kind
// - `NonTerminalPair`: a (consonant, vowel) pitch pair, the key every
//   catalog is indexed by
// - `DurationRange`: a closed range of seconds, added component-wise
//
// `NonTerminalPair` forms a monoid under `+` like `Pitch`, with
// `NonTerminalPair::identity()` (unison, unison) as identity. It serializes
// as its display string `"(c, v)"` so catalogs keyed by pairs stay plain
// JSON objects.

use lalia_grammar::{GrammarError, Pitch};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Which side of the language a phoneme belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeKind {
    /// Realizes the time (rhythm) grammar.
    Consonant,
    /// Realizes the pitch (melody) grammar.
    Vowel,
}

/// A single phoneme in X-SAMPA notation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Phoneme {
    pub xsampa: String,
    pub kind: PhonemeKind,
}

impl Phoneme {
    pub fn new(xsampa: impl Into<String>, kind: PhonemeKind) -> Self {
        Phoneme {
            xsampa: xsampa.into(),
            kind,
        }
    }

    pub fn consonant(xsampa: impl Into<String>) -> Self {
        Phoneme::new(xsampa, PhonemeKind::Consonant)
    }

    pub fn vowel(xsampa: impl Into<String>) -> Self {
        Phoneme::new(xsampa, PhonemeKind::Vowel)
    }

    pub fn is_vowel(&self) -> bool {
        self.kind == PhonemeKind::Vowel
    }

    pub fn is_consonant(&self) -> bool {
        self.kind == PhonemeKind::Consonant
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xsampa)
    }
}

/// A (consonant, vowel) pair of grammar symbols.
///
/// Ordering is consonant first, then vowel, which is the iteration order of
/// every catalog keyed by pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminalPair {
    pub consonant: Pitch,
    pub vowel: Pitch,
}

impl NonTerminalPair {
    pub fn new(consonant: Pitch, vowel: Pitch) -> Self {
        NonTerminalPair { consonant, vowel }
    }

    /// The (unison, unison) pair.
    pub fn identity() -> Self {
        NonTerminalPair::default()
    }

    pub fn is_identity(&self) -> bool {
        self.consonant.is_unison() && self.vowel.is_unison()
    }

    /// The side realized by phonemes of `kind`.
    pub fn side(&self, kind: PhonemeKind) -> &Pitch {
        match kind {
            PhonemeKind::Consonant => &self.consonant,
            PhonemeKind::Vowel => &self.vowel,
        }
    }
}

impl fmt::Display for NonTerminalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.consonant, self.vowel)
    }
}

impl FromStr for NonTerminalPair {
    type Err = GrammarError;

    /// Parse the display form `"(c, v)"`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (consonant, vowel) = text
            .trim()
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .and_then(|inner| inner.split_once(','))
            .ok_or_else(|| GrammarError::InvalidRatio(text.to_string()))?;
        Ok(NonTerminalPair::new(consonant.parse()?, vowel.parse()?))
    }
}

// Serialized as the display string so pairs can be JSON map keys
// (serde_json requires string keys).
impl Serialize for NonTerminalPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NonTerminalPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Add for NonTerminalPair {
    type Output = NonTerminalPair;

    fn add(self, other: NonTerminalPair) -> NonTerminalPair {
        &self + &other
    }
}

impl<'a> Add<&'a NonTerminalPair> for &'a NonTerminalPair {
    type Output = NonTerminalPair;

    fn add(self, other: &'a NonTerminalPair) -> NonTerminalPair {
        NonTerminalPair {
            consonant: &self.consonant + &other.consonant,
            vowel: &self.vowel + &other.vowel,
        }
    }
}

impl AddAssign<&NonTerminalPair> for NonTerminalPair {
    fn add_assign(&mut self, other: &NonTerminalPair) {
        *self = &*self + other;
    }
}

impl Sub for NonTerminalPair {
    type Output = NonTerminalPair;

    fn sub(self, other: NonTerminalPair) -> NonTerminalPair {
        NonTerminalPair {
            consonant: self.consonant - other.consonant,
            vowel: self.vowel - other.vowel,
        }
    }
}

impl Sum for NonTerminalPair {
    fn sum<I: Iterator<Item = NonTerminalPair>>(iter: I) -> NonTerminalPair {
        iter.fold(NonTerminalPair::identity(), |total, pair| total + pair)
    }
}

impl<'a> Sum<&'a NonTerminalPair> for NonTerminalPair {
    fn sum<I: Iterator<Item = &'a NonTerminalPair>>(iter: I) -> NonTerminalPair {
        iter.fold(NonTerminalPair::identity(), |total, pair| &total + pair)
    }
}

/// A closed range of seconds `[start, end]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub start: f64,
    pub end: f64,
}

impl DurationRange {
    pub const fn new(start: f64, end: f64) -> Self {
        DurationRange { start, end }
    }

    pub const ZERO: DurationRange = DurationRange::new(0.0, 0.0);
}

impl Add for DurationRange {
    type Output = DurationRange;

    fn add(self, other: DurationRange) -> DurationRange {
        DurationRange::new(self.start + other.start, self.end + other.end)
    }
}

impl AddAssign for DurationRange {
    fn add_assign(&mut self, other: DurationRange) {
        *self = *self + other;
    }
}

impl Sum for DurationRange {
    fn sum<I: Iterator<Item = DurationRange>>(iter: I) -> DurationRange {
        iter.fold(DurationRange::ZERO, |total, range| total + range)
    }
}

impl fmt::Display for DurationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s..{:.2}s", self.start, self.end)
    }
}
