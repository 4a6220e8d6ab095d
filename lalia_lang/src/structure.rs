// Nested language structures: PhonemeGroup -> Word -> Sentence -> Paragraph -> Page.
//
// Every level implements `LanguageStructure`, which exposes a duration
// range, the rest that follows the structure, and two movements:
// - pitch movement: sum of the vowel pitches inside the structure;
// - time movement: sum of the consonant pitches inside the structure.
// `non_terminal_pair()` is `(time_movement, pitch_movement)`, the
// (consonant, vowel) pair the structure realizes.
//
// `PhonemeGroup` and `Word` are concrete structs. Sentence, Paragraph and
// Page share one generic container, `Nested<C>`, tagged with a `Level` so
// the rest duration and the text rendering know which level they are at.
// The nesting depth is fixed by the type aliases; nothing inspects types at
// runtime.
//
// Durations:
// - a phoneme group carries its own range (default 0.2..0.3 s);
// - a word lasts the sum of its groups;
// - a container lasts the sum of its children plus the rests between them
//   (the last child's rest belongs to the container's own rest).
//
// Structural equality (`PartialEq`) compares content only, which is what
// the combination catalog uses to tell distinct pages apart.

use crate::types::{DurationRange, NonTerminalPair, Phoneme, PhonemeKind};
use lalia_grammar::Pitch;
use serde::{Deserialize, Serialize};

/// Default sounding duration of a phoneme group.
pub const PHONEME_GROUP_DURATION: DurationRange = DurationRange::new(0.2, 0.3);
const PHONEME_GROUP_REST: DurationRange = DurationRange::new(0.1, 0.2);
const WORD_REST: DurationRange = DurationRange::new(0.5, 1.0);
const SENTENCE_REST: DurationRange = DurationRange::new(1.0, 1.5);
const PARAGRAPH_REST: DurationRange = DurationRange::new(2.0, 3.0);
const PAGE_REST: DurationRange = DurationRange::new(4.0, 6.0);

/// Shared view over every level of the language hierarchy.
pub trait LanguageStructure {
    /// How long the structure itself sounds.
    fn duration(&self) -> DurationRange;

    /// The rest that follows the structure.
    fn rest_duration(&self) -> DurationRange;

    /// Sum of vowel pitches.
    fn pitch_movement(&self) -> Pitch;

    /// Sum of consonant pitches.
    fn time_movement(&self) -> Pitch;

    fn non_terminal_pair(&self) -> NonTerminalPair {
        NonTerminalPair::new(self.time_movement(), self.pitch_movement())
    }
}

/// One or more phonemes sounding as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeGroup {
    pub phonemes: Vec<Phoneme>,
    pub duration: DurationRange,
    pub pitch_movement: Pitch,
    pub time_movement: Pitch,
}

impl PhonemeGroup {
    /// A single-phoneme group whose movement is `pitch` on the phoneme's side.
    pub fn single(phoneme: Phoneme, pitch: Pitch) -> Self {
        let (pitch_movement, time_movement) = match phoneme.kind {
            PhonemeKind::Vowel => (pitch, Pitch::unison()),
            PhonemeKind::Consonant => (Pitch::unison(), pitch),
        };
        PhonemeGroup {
            phonemes: vec![phoneme],
            duration: PHONEME_GROUP_DURATION,
            pitch_movement,
            time_movement,
        }
    }

    pub fn is_all_consonants(&self) -> bool {
        self.phonemes.iter().all(Phoneme::is_consonant)
    }

    pub fn is_all_vowels(&self) -> bool {
        self.phonemes.iter().all(Phoneme::is_vowel)
    }

    /// Merge `other` into this group, keeping order and summing durations
    /// and movements.
    fn absorb(&mut self, other: PhonemeGroup) {
        self.phonemes.extend(other.phonemes);
        self.duration += other.duration;
        self.pitch_movement = &self.pitch_movement + &other.pitch_movement;
        self.time_movement = &self.time_movement + &other.time_movement;
    }
}

impl LanguageStructure for PhonemeGroup {
    fn duration(&self) -> DurationRange {
        self.duration
    }

    fn rest_duration(&self) -> DurationRange {
        PHONEME_GROUP_REST
    }

    fn pitch_movement(&self) -> Pitch {
        self.pitch_movement.clone()
    }

    fn time_movement(&self) -> Pitch {
        self.time_movement.clone()
    }
}

/// A word: an ordered run of phoneme groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub groups: Vec<PhonemeGroup>,
}

impl Word {
    pub fn new(groups: Vec<PhonemeGroup>) -> Self {
        Word { groups }
    }

    /// All phonemes in order.
    pub fn phonemes(&self) -> impl Iterator<Item = &Phoneme> {
        self.groups.iter().flat_map(|group| group.phonemes.iter())
    }

    /// The word as concatenated X-SAMPA codes.
    pub fn xsampa(&self) -> String {
        self.phonemes().map(|p| p.xsampa.as_str()).collect()
    }

    /// Tie consonants onto the vowels they precede.
    ///
    /// First consecutive all-consonant groups are merged, then each
    /// all-consonant group is merged into a directly following all-vowel
    /// group. Durations add up and movements are preserved, so the tied
    /// word realizes the same non-terminal pair.
    pub fn tie_consonants(&self) -> Word {
        let groups = tie_by(self.groups.clone(), |a, b| {
            a.is_all_consonants() && b.is_all_consonants()
        });
        let groups = tie_by(groups, |a, b| a.is_all_consonants() && b.is_all_vowels());
        Word { groups }
    }
}

fn tie_by(
    groups: Vec<PhonemeGroup>,
    should_tie: impl Fn(&PhonemeGroup, &PhonemeGroup) -> bool,
) -> Vec<PhonemeGroup> {
    let mut tied: Vec<PhonemeGroup> = Vec::with_capacity(groups.len());
    for group in groups {
        match tied.last_mut() {
            Some(last) if should_tie(last, &group) => last.absorb(group),
            _ => tied.push(group),
        }
    }
    tied
}

impl LanguageStructure for Word {
    fn duration(&self) -> DurationRange {
        self.groups.iter().map(|group| group.duration).sum()
    }

    fn rest_duration(&self) -> DurationRange {
        WORD_REST
    }

    fn pitch_movement(&self) -> Pitch {
        self.groups.iter().map(|group| &group.pitch_movement).sum()
    }

    fn time_movement(&self) -> Pitch {
        self.groups.iter().map(|group| &group.time_movement).sum()
    }
}

/// Which container level a `Nested` value sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Sentence,
    Paragraph,
    Page,
}

impl Level {
    pub fn rest_duration(self) -> DurationRange {
        match self {
            Level::Sentence => SENTENCE_REST,
            Level::Paragraph => PARAGRAPH_REST,
            Level::Page => PAGE_REST,
        }
    }
}

/// A container of lower-level structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nested<C> {
    pub level: Level,
    pub children: Vec<C>,
}

pub type Sentence = Nested<Word>;
pub type Paragraph = Nested<Sentence>;
pub type Page = Nested<Paragraph>;

impl<C> Nested<C> {
    pub fn new(level: Level, children: Vec<C>) -> Self {
        Nested { level, children }
    }
}

impl<C: LanguageStructure> LanguageStructure for Nested<C> {
    fn duration(&self) -> DurationRange {
        let sounding: DurationRange = self.children.iter().map(C::duration).sum();
        let rests: DurationRange = self
            .children
            .iter()
            .take(self.children.len().saturating_sub(1))
            .map(C::rest_duration)
            .sum();
        sounding + rests
    }

    fn rest_duration(&self) -> DurationRange {
        self.level.rest_duration()
    }

    fn pitch_movement(&self) -> Pitch {
        self.children.iter().map(C::pitch_movement).sum()
    }

    fn time_movement(&self) -> Pitch {
        self.children.iter().map(C::time_movement).sum()
    }
}

impl Nested<Word> {
    pub fn sentence(words: Vec<Word>) -> Self {
        Nested::new(Level::Sentence, words)
    }

    /// Words separated by spaces, terminated by a period.
    pub fn as_xsampa_text(&self) -> String {
        let words: Vec<String> = self.children.iter().map(Word::xsampa).collect();
        format!("{}.", words.join(" "))
    }
}

impl Nested<Sentence> {
    pub fn paragraph(sentences: Vec<Sentence>) -> Self {
        Nested::new(Level::Paragraph, sentences)
    }

    pub fn as_xsampa_text(&self) -> String {
        let sentences: Vec<String> = self.children.iter().map(Sentence::as_xsampa_text).collect();
        sentences.join(" ")
    }
}

/// Counts of the structures inside one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStats {
    pub paragraphs: usize,
    pub sentences: usize,
    pub words: usize,
    pub phonemes: usize,
}

impl Nested<Paragraph> {
    pub fn page(paragraphs: Vec<Paragraph>) -> Self {
        Nested::new(Level::Page, paragraphs)
    }

    /// Paragraphs separated by blank lines.
    pub fn as_xsampa_text(&self) -> String {
        let paragraphs: Vec<String> = self
            .children
            .iter()
            .map(Paragraph::as_xsampa_text)
            .collect();
        paragraphs.join("\n\n")
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.children
            .iter()
            .flat_map(|paragraph| paragraph.children.iter())
    }

    /// Every word on the page in reading order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.sentences().flat_map(|sentence| sentence.children.iter())
    }

    pub fn phoneme_groups(&self) -> impl Iterator<Item = &PhonemeGroup> {
        self.words().flat_map(|word| word.groups.iter())
    }

    pub fn stats(&self) -> PageStats {
        PageStats {
            paragraphs: self.children.len(),
            sentences: self.sentences().count(),
            words: self.words().count(),
            phonemes: self.phoneme_groups().map(|g| g.phonemes.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> Pitch {
        text.parse().unwrap()
    }

    fn consonant(xsampa: &str, pitch: &str) -> PhonemeGroup {
        PhonemeGroup::single(Phoneme::consonant(xsampa), p(pitch))
    }

    fn vowel(xsampa: &str, pitch: &str) -> PhonemeGroup {
        PhonemeGroup::single(Phoneme::vowel(xsampa), p(pitch))
    }

    fn approx(range: DurationRange, start: f64, end: f64) -> bool {
        (range.start - start).abs() < 1e-9 && (range.end - end).abs() < 1e-9
    }

    fn sample_page() -> Page {
        let ma = Word::new(vec![consonant("m", "3/2"), vowel("a", "5/4")]);
        let no = Word::new(vec![consonant("n", "2/3"), vowel("o", "4/5")]);
        let i = Word::new(vec![vowel("i", "3/2")]);
        Page::page(vec![
            Paragraph::paragraph(vec![
                Sentence::sentence(vec![ma.clone(), no.clone()]),
                Sentence::sentence(vec![i.clone()]),
            ]),
            Paragraph::paragraph(vec![Sentence::sentence(vec![no, ma])]),
        ])
    }

    #[test]
    fn test_single_group_movements_follow_kind() {
        let m = consonant("m", "3/2");
        assert_eq!(m.non_terminal_pair(), NonTerminalPair::new(p("3/2"), Pitch::unison()));
        let a = vowel("a", "5/4");
        assert_eq!(a.non_terminal_pair(), NonTerminalPair::new(Pitch::unison(), p("5/4")));
    }

    #[test]
    fn test_word_sums_groups() {
        let word = Word::new(vec![consonant("m", "3/2"), vowel("a", "5/4"), vowel("o", "6/5")]);
        assert_eq!(word.pitch_movement(), p("3/2"));
        assert_eq!(word.time_movement(), p("3/2"));
        assert!(approx(word.duration(), 0.6, 0.9));
        assert!(approx(word.rest_duration(), 0.5, 1.0));
        assert_eq!(word.xsampa(), "mao");
    }

    #[test]
    fn test_container_duration_counts_inner_rests() {
        let word = Word::new(vec![vowel("a", "5/4")]);
        let sentence = Sentence::sentence(vec![word.clone(), word]);
        // Two words of 0.2..0.3 plus one word rest of 0.5..1.0.
        assert!(approx(sentence.duration(), 0.9, 1.6));
        assert!(approx(sentence.rest_duration(), 1.0, 1.5));
    }

    #[test]
    fn test_page_movements_and_pair() {
        let page = sample_page();
        // Vowels: 5/4 * 4/5 * 3/2 * 4/5 * 5/4 = 3/2.
        assert_eq!(page.pitch_movement(), p("3/2"));
        // Consonants: 3/2 * 2/3 * 2/3 * 3/2 = 1/1.
        assert!(page.time_movement().is_unison());
        assert_eq!(page.non_terminal_pair(), NonTerminalPair::new(Pitch::unison(), p("3/2")));
    }

    #[test]
    fn test_page_text_and_stats() {
        let page = sample_page();
        assert_eq!(page.as_xsampa_text(), "ma no. i.\n\nno ma.");
        assert_eq!(
            page.stats(),
            PageStats {
                paragraphs: 2,
                sentences: 3,
                words: 5,
                phonemes: 9,
            }
        );
        assert_eq!(page.words().count(), 5);
        assert_eq!(page.phoneme_groups().count(), 9);
    }

    #[test]
    fn test_tie_consonants() {
        let word = Word::new(vec![
            consonant("s", "3/2"),
            consonant("t", "7/4"),
            vowel("a", "5/4"),
            vowel("o", "4/5"),
            consonant("n", "2/3"),
        ]);
        let tied = word.tie_consonants();
        let texts: Vec<String> = tied
            .groups
            .iter()
            .map(|g| g.phonemes.iter().map(|p| p.xsampa.as_str()).collect())
            .collect();
        assert_eq!(texts, vec!["sta", "o", "n"]);
        assert!(approx(tied.groups[0].duration, 0.6, 0.9));
        assert_eq!(tied.non_terminal_pair(), word.non_terminal_pair());
        assert!(approx(tied.duration(), 1.0, 1.5));
    }

    #[test]
    fn test_page_serde_roundtrip() {
        let page = sample_page();
        let json = serde_json::to_string(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(page, back);
    }
}
