//! Language resources: morphology, spelling correction and language detection.
//!
//! Resources are built once when a pipeline is set up and shared read-only between queries,
//! so every trait here requires `Send + Sync`.

mod detect;
mod morphology;
mod spelling;

use std::{collections::HashMap, sync::Arc};

use lq_config::Config;

pub use detect::{LanguageDetector, ScriptLanguageDetector};
pub use morphology::{EnglishMorphology, Morphology};
pub use spelling::{DictionarySpellChecker, SpellChecker};

/// Shared language engines handed to the passes that need them.
#[derive(Clone, Default)]
pub struct LanguageResources {
    /// Morphology engines by language code.
    pub morphologies: HashMap<String, Arc<dyn Morphology>>,
    /// Spelling correction, absent when there is no dictionary.
    pub spell_checker: Option<Arc<dyn SpellChecker>>,
}

impl LanguageResources {
    /// Builds the engines a configuration asks for.
    pub fn from_config(config: &Config) -> Self {
        let mut morphologies: HashMap<String, Arc<dyn Morphology>> = HashMap::new();
        morphologies.insert("en".to_string(), Arc::new(EnglishMorphology::new()));

        let checker = DictionarySpellChecker::from_dictionary(&config.spellcheck.dictionary);
        let spell_checker =
            (!checker.is_empty()).then(|| Arc::new(checker) as Arc<dyn SpellChecker>);

        Self {
            morphologies,
            spell_checker,
        }
    }
}
