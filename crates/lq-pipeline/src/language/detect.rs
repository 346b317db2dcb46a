//! Language detection.

/// Guesses the language of a query.
pub trait LanguageDetector: Send + Sync {
    /// Returns a lowercase language code, or `None` when unsure.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detects languages with a distinctive script.
///
/// Latin text is shared by too many languages to call, so it yields `None` and the caller's
/// hint applies.
#[derive(Debug, Clone, Copy)]
pub struct ScriptLanguageDetector {
    /// Minimum share of letters in one script.
    threshold: f32,
}

impl Default for ScriptLanguageDetector {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl ScriptLanguageDetector {
    /// Creates a detector requiring `threshold` of the letters to share a script.
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl LanguageDetector for ScriptLanguageDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let mut letters = 0usize;
        let mut cyrillic = 0usize;
        let mut greek = 0usize;
        for c in text.chars().filter(|c| c.is_alphabetic()) {
            letters += 1;
            match c {
                '\u{0400}'..='\u{04ff}' => cyrillic += 1,
                '\u{0370}'..='\u{03ff}' => greek += 1,
                _ => {}
            }
        }
        if letters == 0 {
            return None;
        }

        let share = |count: usize| count as f32 / letters as f32;
        if share(cyrillic) >= self.threshold {
            Some(String::from("ru"))
        } else if share(greek) >= self.threshold {
            Some(String::from("el"))
        } else {
            None
        }
    }
}
