// Just-intonation pitches: the symbol values of every lalia grammar.
//
// A `Pitch` is a frequency ratio stored as its prime factorization: a vector
// of exponents over the primes 2, 3, 5, 7, ... (index 0 is the octave). Adding
// two pitches multiplies their ratios, which is plain component-wise addition
// of the exponent vectors, so pitches form a commutative group with the
// unison (1/1, the empty vector) as identity. The grammars only ever rely on
// the monoid part (`+` and `unison()`); subtraction is used when pairs of
// movements are compared downstream.
//
// Trailing zero exponents are always trimmed, so derived `Eq`, `Ord` and
// `Hash` are structural: `3/2` parsed from a string and `3/2` produced as
// `9/4 + 2/3` are the same value. Ordering is lexicographic on the exponent
// vector, which is arbitrary musically but stable, and is what keeps every
// `BTreeMap` keyed by pitches deterministic.
//
// On the wire (JSON) a pitch is its ratio string, e.g. `"15/8"`.

use crate::error::GrammarError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

/// Primes covering every ratio the bundled grammars use. Larger primes are
/// computed on demand by `prime()`.
const SMALL_PRIMES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Largest prime accepted while parsing a ratio string.
const MAX_PARSE_PRIME: u64 = 997;

type Exponents = SmallVec<[i32; 4]>;

/// A just-intonation pitch ratio, stored as prime exponents.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    exponents: Exponents,
}

impl Pitch {
    /// The identity pitch 1/1.
    pub fn unison() -> Self {
        Pitch::default()
    }

    /// Build a pitch from exponents over 2, 3, 5, 7, ...
    pub fn from_exponents(exponents: impl IntoIterator<Item = i32>) -> Self {
        let mut pitch = Pitch {
            exponents: exponents.into_iter().collect(),
        };
        pitch.normalize();
        pitch
    }

    /// Prime exponents, octave first. Empty for the unison.
    pub fn exponents(&self) -> &[i32] {
        &self.exponents
    }

    pub fn is_unison(&self) -> bool {
        self.exponents.is_empty()
    }

    /// The ratio as `(numerator, denominator)` in lowest terms, or `None` if
    /// either part overflows `u128`.
    pub fn ratio(&self) -> Option<(u128, u128)> {
        let mut numerator: u128 = 1;
        let mut denominator: u128 = 1;
        for (index, &exponent) in self.exponents.iter().enumerate() {
            if exponent == 0 {
                continue;
            }
            let factor = u128::from(prime(index)).checked_pow(exponent.unsigned_abs())?;
            if exponent > 0 {
                numerator = numerator.checked_mul(factor)?;
            } else {
                denominator = denominator.checked_mul(factor)?;
            }
        }
        Some((numerator, denominator))
    }

    fn normalize(&mut self) {
        while self.exponents.last() == Some(&0) {
            self.exponents.pop();
        }
    }

    fn combine(&self, other: &Pitch, sign: i32) -> Pitch {
        let length = self.exponents.len().max(other.exponents.len());
        let exponents = (0..length).map(|index| {
            let left = self.exponents.get(index).copied().unwrap_or(0);
            let right = other.exponents.get(index).copied().unwrap_or(0);
            left + sign * right
        });
        Pitch::from_exponents(exponents)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio() {
            Some((numerator, denominator)) => write!(f, "{}/{}", numerator, denominator),
            None => write!(f, "{:?}", self.exponents.as_slice()),
        }
    }
}

impl FromStr for Pitch {
    type Err = GrammarError;

    /// Parse `"n/d"` or `"n"` with positive integers.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || GrammarError::InvalidRatio(text.to_string());
        let (numerator, denominator) = match text.trim().split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (text.trim(), "1"),
        };
        let numerator: u64 = numerator.parse().map_err(|_| invalid())?;
        let denominator: u64 = denominator.parse().map_err(|_| invalid())?;
        if numerator == 0 || denominator == 0 {
            return Err(invalid());
        }
        let upper = factorize(numerator).ok_or_else(invalid)?;
        let lower = factorize(denominator).ok_or_else(invalid)?;
        Ok(upper - lower)
    }
}

impl TryFrom<String> for Pitch {
    type Error = GrammarError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.to_string()
    }
}

impl Add for Pitch {
    type Output = Pitch;

    fn add(self, other: Pitch) -> Pitch {
        self.combine(&other, 1)
    }
}

impl<'a> Add<&'a Pitch> for &'a Pitch {
    type Output = Pitch;

    fn add(self, other: &'a Pitch) -> Pitch {
        self.combine(other, 1)
    }
}

impl Sub for Pitch {
    type Output = Pitch;

    fn sub(self, other: Pitch) -> Pitch {
        self.combine(&other, -1)
    }
}

impl<'a> Sub<&'a Pitch> for &'a Pitch {
    type Output = Pitch;

    fn sub(self, other: &'a Pitch) -> Pitch {
        self.combine(other, -1)
    }
}

impl Neg for Pitch {
    type Output = Pitch;

    fn neg(self) -> Pitch {
        Pitch::from_exponents(self.exponents.iter().map(|e| -e))
    }
}

impl Sum for Pitch {
    fn sum<I: Iterator<Item = Pitch>>(iter: I) -> Pitch {
        iter.fold(Pitch::unison(), |total, pitch| total + pitch)
    }
}

impl<'a> Sum<&'a Pitch> for Pitch {
    fn sum<I: Iterator<Item = &'a Pitch>>(iter: I) -> Pitch {
        iter.fold(Pitch::unison(), |total, pitch| &total + pitch)
    }
}

/// The `index`-th prime (0 → 2).
fn prime(index: usize) -> u64 {
    if let Some(&p) = SMALL_PRIMES.get(index) {
        return p;
    }
    let mut count = SMALL_PRIMES.len() - 1;
    let mut candidate = SMALL_PRIMES[count];
    while count < index {
        candidate += 2;
        if is_prime(candidate) {
            count += 1;
        }
    }
    candidate
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

/// Prime exponents of `n`, or `None` if it has a factor above `MAX_PARSE_PRIME`.
fn factorize(mut n: u64) -> Option<Pitch> {
    let mut exponents = Exponents::new();
    let mut index = 0;
    while n > 1 {
        let p = prime(index);
        if p > MAX_PARSE_PRIME {
            return None;
        }
        let mut exponent = 0;
        while n % p == 0 {
            n /= p;
            exponent += 1;
        }
        exponents.push(exponent);
        index += 1;
    }
    Some(Pitch::from_exponents(exponents))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> Pitch {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(p("3/2").to_string(), "3/2");
        assert_eq!(p("15/8").to_string(), "15/8");
        assert_eq!(p("6/4").to_string(), "3/2");
        assert_eq!(p("5").to_string(), "5/1");
        assert_eq!(p("1/1").to_string(), "1/1");
    }

    #[test]
    fn test_exponents_are_trimmed() {
        assert_eq!(p("3/2").exponents(), &[-1, 1]);
        assert_eq!(p("2/1").exponents(), &[1]);
        assert!(p("7/7").is_unison());
        assert_eq!(Pitch::from_exponents([1, 0, 0]), p("2/1"));
    }

    #[test]
    fn test_addition_multiplies_ratios() {
        assert_eq!(p("3/2") + p("5/4"), p("15/8"));
        assert_eq!(p("9/4") + p("2/3"), p("3/2"));
        assert_eq!(p("3/2") + p("2/3"), Pitch::unison());
    }

    #[test]
    fn test_subtraction_and_negation() {
        assert_eq!(p("15/8") - p("5/4"), p("3/2"));
        assert_eq!(-p("3/2"), p("2/3"));
        assert_eq!(&p("4/5") - &p("4/5"), Pitch::unison());
    }

    #[test]
    fn test_sum_starts_from_unison() {
        let pitches = [p("3/2"), p("5/4"), p("4/5")];
        let total: Pitch = pitches.iter().sum();
        assert_eq!(total, p("3/2"));
        let empty: Pitch = Vec::<Pitch>::new().into_iter().sum();
        assert!(empty.is_unison());
    }

    #[test]
    fn test_invalid_ratios_are_rejected() {
        assert!("".parse::<Pitch>().is_err());
        assert!("0/3".parse::<Pitch>().is_err());
        assert!("3/0".parse::<Pitch>().is_err());
        assert!("a/b".parse::<Pitch>().is_err());
        assert!("1009/1".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_large_primes_round_trip() {
        let pitch = p("41/37");
        assert_eq!(pitch.to_string(), "41/37");
        assert_eq!(pitch.exponents().len(), 13);
    }

    #[test]
    fn test_serde_uses_ratio_strings() {
        let json = serde_json::to_string(&p("16/15")).unwrap();
        assert_eq!(json, "\"16/15\"");
        let back: Pitch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p("16/15"));
        assert!(serde_json::from_str::<Pitch>("\"x\"").is_err());
    }
}
