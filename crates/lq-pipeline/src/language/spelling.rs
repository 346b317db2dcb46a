//! Spelling correction.

use std::{collections::BTreeMap, fmt, str};

use levenshtein_automata::{DFA, Distance, LevenshteinAutomatonBuilder, SINK_STATE};
use tantivy_fst::{Automaton, IntoStreamer, Map, Streamer};
use tracing::warn;

/// Longest word, in characters, that is looked up for corrections.
const MAX_WORD_CHARS: usize = 32;

/// Largest edit distance tried.
const MAX_DISTANCE: u8 = 2;

/// Corrects misspelled words.
pub trait SpellChecker: Send + Sync {
    /// Returns the most likely intended word, or `None` if `word` looks right or nothing
    /// better is known.
    fn correct(&self, word: &str) -> Option<String>;
}

/// Wrapper that implements `tantivy_fst::Automaton` for `levenshtein_automata::DFA`.
struct LevenshteinDfa(DFA);

impl Automaton for LevenshteinDfa {
    type State = u32;

    fn start(&self) -> Self::State {
        self.0.initial_state()
    }

    fn is_match(&self, state: &Self::State) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &Self::State) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &Self::State, byte: u8) -> Self::State {
        self.0.transition(*state, byte)
    }
}

/// Frequency-dictionary spell checker.
///
/// Words live in an FST keyed by word with the frequency as value. Known words are left
/// alone. Otherwise the most frequent dictionary word one edit away wins, then two edits
/// away. An adjacent transposition counts as one edit. Ties go to the alphabetically first
/// word. Words longer than 32 characters are not corrected.
#[derive(Default)]
pub struct DictionarySpellChecker {
    /// Word -> frequency; `None` when the dictionary is empty.
    words: Option<Map<Vec<u8>>>,
    /// Automaton builders for distance 1 and 2.
    builders: Vec<LevenshteinAutomatonBuilder>,
}

impl DictionarySpellChecker {
    /// Creates a checker from word frequencies.
    ///
    /// Words are lowercased; a word listed twice keeps its highest frequency.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut sorted: BTreeMap<String, u64> = BTreeMap::new();
        for (word, count) in words {
            let entry = sorted.entry(word.into().to_lowercase()).or_default();
            *entry = (*entry).max(count);
        }
        if sorted.is_empty() {
            return Self::default();
        }

        let words = match Map::from_iter(sorted) {
            Ok(map) => Some(map),
            Err(err) => {
                warn!(error = %err, "failed to build spelling dictionary");
                None
            }
        };
        let builders = (1..=MAX_DISTANCE)
            .map(|distance| LevenshteinAutomatonBuilder::new(distance, true))
            .collect();
        Self { words, builders }
    }

    /// Creates a checker from a configured dictionary.
    pub fn from_dictionary(dictionary: &BTreeMap<String, u64>) -> Self {
        Self::new(dictionary.iter().map(|(w, &c)| (w.as_str(), c)))
    }

    /// Returns true if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.as_ref().is_none_or(|map| map.len() == 0)
    }

    /// Returns the most frequent dictionary word matched by `dfa`.
    fn best(map: &Map<Vec<u8>>, dfa: DFA) -> Option<String> {
        let mut stream = map.search(LevenshteinDfa(dfa)).into_stream();
        let mut best: Option<(String, u64)> = None;
        // Keys stream in order, so a strictly greater count is needed to replace the best.
        while let Some((key, count)) = stream.next() {
            if best.as_ref().is_some_and(|(_, top)| *top >= count) {
                continue;
            }
            if let Ok(word) = str::from_utf8(key) {
                best = Some((word.to_string(), count));
            }
        }
        best.map(|(word, _)| word)
    }
}

impl fmt::Debug for DictionarySpellChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictionarySpellChecker")
            .field("words", &self.words.as_ref().map_or(0, Map::len))
            .finish_non_exhaustive()
    }
}

impl SpellChecker for DictionarySpellChecker {
    fn correct(&self, word: &str) -> Option<String> {
        let map = self.words.as_ref()?;
        let word = word.to_lowercase();
        if word.chars().count() > MAX_WORD_CHARS
            || !word.chars().all(char::is_alphabetic)
            || map.contains_key(&word)
        {
            return None;
        }

        self.builders
            .iter()
            .find_map(|builder| Self::best(map, builder.build_dfa(&word)))
    }
}
