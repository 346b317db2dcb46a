//! Configuration file parsing.
//!
//! Parses a pipeline TOML file into an intermediate `RawConfig` that preserves the optional
//! nature of every field before defaults are applied.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::{BlankQuery, ConfigError, SortDirection, TextStage, TreeStage};

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional; missing values take the defaults of [`Config`](crate::Config).
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Language hint used when detection fails.
    pub language: Option<String>,
    /// Query used when nothing is left to search for.
    pub blank: Option<BlankQuery>,
    /// Field validation and aliases.
    pub fields: Option<RawFieldSettings>,
    /// Sort directive extraction.
    pub order_by: Option<RawOrderBySettings>,
    /// Morphological expansion.
    pub morphology: Option<RawMorphologySettings>,
    /// Synonym expansion.
    pub synonyms: Option<RawSynonymSettings>,
    /// Spelling correction.
    pub spellcheck: Option<RawSpellcheckSettings>,
    /// DOI detection.
    pub doi: Option<RawDoiSettings>,
    /// Marker words.
    pub markers: Option<RawMarkerSettings>,
    /// Exact-phrase boosting.
    pub exact_match: Option<RawExactMatchSettings>,
    /// Transformer chains.
    pub pipeline: Option<RawPipelineSettings>,
}

/// A score written either as a string (`"0.65"`) or as a TOML number (`0.65`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// Decimal string.
    Text(String),
}

impl RawScore {
    /// Returns the score as written, for decimal parsing.
    pub fn as_text(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }
}

/// Raw `[fields]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFieldSettings {
    /// Field names accepted in `field:expr`.
    pub valid: Option<Vec<String>>,
    /// Field names always rejected.
    pub invalid: Option<Vec<String>>,
    /// Alias -> canonical field name.
    pub aliases: Option<BTreeMap<String, String>>,
    /// Drop rejected fields instead of demoting them to plain words.
    pub strict: Option<bool>,
}

/// Raw `[order_by]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawOrderBySettings {
    /// Pseudo-field carrying the sort field.
    pub field: Option<String>,
    /// Sortable fields.
    pub valid: Option<Vec<String>>,
    /// Alias -> canonical sort field.
    pub aliases: Option<BTreeMap<String, String>>,
    /// Sort direction recorded for the directive.
    pub direction: Option<SortDirection>,
}

/// Raw `[morphology]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMorphologySettings {
    /// Derive word forms.
    pub enabled: Option<bool>,
    /// Add the accent-normalized alternate.
    pub accent: Option<bool>,
    /// Boost of derived forms.
    pub score: Option<RawScore>,
    /// Use `1/len(alternates)` instead of the fixed score.
    pub decreasing: Option<bool>,
}

/// Raw `[synonyms]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSynonymSettings {
    /// Inline synonym sets.
    pub sets: Option<Vec<Vec<String>>>,
    /// Synonym list files. Accepts either a single path or an array of paths.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub files: Option<Vec<String>>,
}

/// Raw `[spellcheck]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSpellcheckSettings {
    /// Languages to correct.
    pub languages: Option<Vec<String>>,
    /// Word -> frequency.
    pub dictionary: Option<BTreeMap<String, u64>>,
    /// Dictionary files, one `word [count]` per line.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub files: Option<Vec<String>>,
}

/// Raw `[doi]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDoiSettings {
    /// Boost of detected DOI clauses.
    pub score: Option<RawScore>,
    /// Field holding DOIs.
    pub field: Option<String>,
    /// Turn `10.xxxx/prefix*` words into prefix searches.
    pub wildcard: Option<bool>,
}

/// Raw `[markers]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMarkerSettings {
    /// Words that request unfiltered results. Accepts a single word or an array.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub forced_clean: Option<Vec<String>>,
}

/// Raw `[exact_match]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExactMatchSettings {
    /// Field the phrase clause is scoped to.
    pub field: Option<String>,
    /// Fixed boost; the operand count is used when absent.
    pub score: Option<RawScore>,
    /// Slop of the phrase clause.
    pub slop: Option<u32>,
}

/// Raw `[pipeline]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPipelineSettings {
    /// Text transformers, in order.
    pub text: Option<Vec<TextStage>>,
    /// Tree transformers, in order.
    pub tree: Option<Vec<TreeStage>>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for resolution.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
