// Bidirectional phoneme/pitch tables.
//
// Each side of the language (consonants, vowels) maps phonemes to grammar
// pitches. Lookups run both ways:
// - phoneme -> pitch: every listed phoneme has exactly one pitch;
// - pitch -> phoneme: the first phoneme listed for a pitch is canonical.
//   Later phonemes with the same pitch are accepted as clones (e.g. nasal
//   vowels sharing their oral vowel's pitch) but never generated.
//
// JSON form, per side, in canonical order:
//   { "consonants": [{"xsampa": "m", "pitch": "3/2"}, ...],
//     "vowels":     [{"xsampa": "a", "pitch": "3/2"}, ...] }
//
// Validation at construction: an X-SAMPA code may appear once per side,
// and no phoneme may carry the unison (the unison is the silent padding
// symbol and has no realization).

use crate::error::{LangError, LangResult};
use crate::types::{Phoneme, PhonemeKind};
use lalia_grammar::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One JSON row: an X-SAMPA code and its pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeEntry {
    pub xsampa: String,
    pub pitch: Pitch,
}

impl PhonemeEntry {
    pub fn new(xsampa: impl Into<String>, pitch: Pitch) -> Self {
        PhonemeEntry {
            xsampa: xsampa.into(),
            pitch,
        }
    }
}

/// Lookups for one phoneme kind.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PhonemeSide {
    kind: PhonemeKind,
    entries: Vec<(Phoneme, Pitch)>,
    /// Index of the canonical entry per pitch.
    by_pitch: BTreeMap<Pitch, usize>,
    xsampa: BTreeSet<String>,
}

impl PhonemeSide {
    fn new(kind: PhonemeKind, rows: Vec<PhonemeEntry>) -> LangResult<Self> {
        let mut side = PhonemeSide {
            kind,
            entries: Vec::with_capacity(rows.len()),
            by_pitch: BTreeMap::new(),
            xsampa: BTreeSet::new(),
        };
        for row in rows {
            if row.pitch.is_unison() {
                return Err(LangError::UnisonPhoneme { xsampa: row.xsampa });
            }
            let index = side.entries.len();
            if !side.xsampa.insert(row.xsampa.clone()) {
                return Err(LangError::DuplicatePhoneme {
                    xsampa: row.xsampa,
                    kind,
                });
            }
            side.by_pitch.entry(row.pitch.clone()).or_insert(index);
            side.entries.push((Phoneme::new(row.xsampa, kind), row.pitch));
        }
        Ok(side)
    }

    fn rows(&self) -> Vec<PhonemeEntry> {
        self.entries
            .iter()
            .map(|(phoneme, pitch)| PhonemeEntry::new(phoneme.xsampa.clone(), pitch.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhonemeTableDef {
    consonants: Vec<PhonemeEntry>,
    vowels: Vec<PhonemeEntry>,
}

/// Phoneme lookups for both sides of the language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PhonemeTableDef", into = "PhonemeTableDef")]
pub struct PhonemeTable {
    consonants: PhonemeSide,
    vowels: PhonemeSide,
}

impl PhonemeTable {
    pub fn new(consonants: Vec<PhonemeEntry>, vowels: Vec<PhonemeEntry>) -> LangResult<Self> {
        Ok(PhonemeTable {
            consonants: PhonemeSide::new(PhonemeKind::Consonant, consonants)?,
            vowels: PhonemeSide::new(PhonemeKind::Vowel, vowels)?,
        })
    }

    fn side(&self, kind: PhonemeKind) -> &PhonemeSide {
        match kind {
            PhonemeKind::Consonant => &self.consonants,
            PhonemeKind::Vowel => &self.vowels,
        }
    }

    /// The canonical phoneme realizing `pitch` on the `kind` side.
    pub fn phoneme_for(&self, kind: PhonemeKind, pitch: &Pitch) -> Option<&Phoneme> {
        let side = self.side(kind);
        side.by_pitch.get(pitch).map(|&index| &side.entries[index].0)
    }

    pub fn has_phoneme(&self, kind: PhonemeKind, pitch: &Pitch) -> bool {
        self.side(kind).by_pitch.contains_key(pitch)
    }

    /// Every listed phoneme of `kind` with its pitch, in declaration order.
    pub fn phonemes(&self, kind: PhonemeKind) -> impl Iterator<Item = (&Phoneme, &Pitch)> {
        self.side(kind)
            .entries
            .iter()
            .map(|(phoneme, pitch)| (phoneme, pitch))
    }
}

impl TryFrom<PhonemeTableDef> for PhonemeTable {
    type Error = LangError;

    fn try_from(def: PhonemeTableDef) -> Result<Self, Self::Error> {
        PhonemeTable::new(def.consonants, def.vowels)
    }
}

impl From<PhonemeTable> for PhonemeTableDef {
    fn from(table: PhonemeTable) -> Self {
        PhonemeTableDef {
            consonants: table.consonants.rows(),
            vowels: table.vowels.rows(),
        }
    }
}
