//! Morphological form derivation.

use std::collections::HashSet;

use stop_words::LANGUAGE;

/// Derives alternate surface forms of a word.
pub trait Morphology: Send + Sync {
    /// Returns the forms of `word` other than `word` itself, most likely first.
    fn derive_forms(&self, word: &str) -> Vec<String>;
}

/// Suffixes dropped whole (with their `es`) when singularizing.
const SIBILANT_PLURALS: &[&str] = &["sses", "ches", "shes", "xes", "zes"];

/// English number inflection: plural forms of singular nouns and the reverse.
///
/// Stopwords, short words and anything that is not plain ASCII letters have no forms.
#[derive(Debug, Clone)]
pub struct EnglishMorphology {
    /// Lowercase stopwords.
    stopwords: HashSet<String>,
}

impl Default for EnglishMorphology {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishMorphology {
    /// Creates the engine with the standard English stopword list.
    pub fn new() -> Self {
        let stopwords = stop_words::get(LANGUAGE::English)
            .iter()
            .map(|w| w.to_ascii_lowercase())
            .collect();
        Self { stopwords }
    }

    /// Returns the singular form of a plural word.
    fn singular(word: &str) -> Option<String> {
        if let Some(stem) = word.strip_suffix("ies") {
            return (stem.len() >= 2).then(|| format!("{stem}y"));
        }
        if SIBILANT_PLURALS.iter().any(|s| word.ends_with(s)) {
            return word.strip_suffix("es").map(str::to_string);
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return None;
        }
        word.strip_suffix('s').map(str::to_string)
    }

    /// Returns the plural form of a singular word.
    fn plural(word: &str) -> Option<String> {
        if word.ends_with("is") {
            return None;
        }
        if let Some(stem) = word.strip_suffix('y') {
            let after_consonant = stem.chars().last().is_some_and(|c| !"aeiou".contains(c));
            if after_consonant {
                return Some(format!("{stem}ies"));
            }
        }
        if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
            return Some(format!("{word}es"));
        }
        Some(format!("{word}s"))
    }
}

impl Morphology for EnglishMorphology {
    fn derive_forms(&self, word: &str) -> Vec<String> {
        let word = word.to_ascii_lowercase();
        if word.len() < 3
            || !word.chars().all(|c| c.is_ascii_alphabetic())
            || self.stopwords.contains(&word)
        {
            return Vec::new();
        }

        Self::singular(&word)
            .or_else(|| Self::plural(&word))
            .filter(|form| *form != word)
            .into_iter()
            .collect()
    }
}
