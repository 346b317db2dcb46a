//! Configuration for lq query pipelines.
//!
//! A pipeline is described by one TOML file. The file is parsed into a [`RawConfig`] where every
//! value is optional, then resolved into a [`Config`]: defaults are filled in, scores are parsed
//! as decimals, names are lowercased, and synonym lists and dictionaries referenced by path are
//! loaded relative to the file's directory.
//!
//! ```
//! use lq_config::{Config, TreeStage};
//!
//! let config = Config::from_toml_str(
//!     r#"
//! [fields]
//! valid = ["title", "year"]
//!
//! [pipeline]
//! tree = ["field", "optimizing"]
//! "#,
//! )
//! .unwrap();
//! assert!(config.fields.valid.contains("title"));
//! assert_eq!(config.pipeline.tree, vec![TreeStage::Field, TreeStage::Optimizing]);
//! ```

#![warn(missing_docs)]

mod error;
mod parse;
mod resolve;
mod synonyms;
mod validate;

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use error::ConfigError;
pub use parse::{
    RawConfig, RawDoiSettings, RawExactMatchSettings, RawFieldSettings, RawMarkerSettings,
    RawMorphologySettings, RawOrderBySettings, RawPipelineSettings, RawScore,
    RawSpellcheckSettings, RawSynonymSettings, parse_config_file, parse_config_str,
};
pub use resolve::resolve_data_path;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
pub use synonyms::SynonymSets;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Query used when processing leaves nothing to search for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankQuery {
    /// Match every document.
    #[default]
    All,
    /// Match no document.
    Empty,
}

/// Sort direction of an order-by directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortDirection {
    /// Returns the lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Text transformers, applied to the raw query before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStage {
    /// Strip zero-width and control characters.
    Clean,
    /// Lowercase the query.
    Lower,
    /// Collapse whitespace runs.
    Despace,
    /// Drop brackets without a counterpart.
    UnmatchedParentheses,
}

/// Tree transformers, applied to the parsed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStage {
    /// Extract the sort directive.
    OrderBy,
    /// Resolve aliases and reject unknown fields.
    Field,
    /// Remove marker words and record them.
    Markers,
    /// Detect DOIs and DOI URLs.
    Doi,
    /// Add spelling corrections.
    Spellcheck,
    /// Add derived word forms.
    Morphology,
    /// Expand synonyms.
    Synonyms,
    /// Add a boosted phrase clause for multi-word groups.
    ExactMatch,
    /// Reshape the tree for the search backend.
    Tantivy,
    /// Flatten groups and drop neutral boosts.
    Optimizing,
}

/// Fully resolved pipeline configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    /// Language hint used when detection fails.
    pub language: Option<String>,
    /// Query used when nothing is left to search for.
    pub blank: BlankQuery,
    /// Field validation and aliases.
    pub fields: FieldSettings,
    /// Sort directive extraction.
    pub order_by: OrderBySettings,
    /// Morphological expansion.
    pub morphology: MorphologySettings,
    /// Synonym sets, loaded from inline sets and list files.
    pub synonyms: SynonymSets,
    /// Spelling correction.
    pub spellcheck: SpellcheckSettings,
    /// DOI detection.
    pub doi: DoiSettings,
    /// Marker words.
    pub markers: MarkerSettings,
    /// Exact-phrase boosting.
    pub exact_match: ExactMatchSettings,
    /// Transformer chains.
    pub pipeline: PipelineSettings,
    /// Directory of the configuration file, if it was loaded from disk.
    #[serde(skip)]
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads and resolves a configuration file.
    ///
    /// Relative data file paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        let root = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::resolve(raw, Some(root))
    }

    /// Resolves configuration from a TOML string.
    ///
    /// Relative data file paths are resolved against the working directory.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw = parse_config_str(contents, Path::new("<string>"))?;
        Self::resolve(raw, None)
    }

    /// Applies defaults to a raw configuration and loads referenced data files.
    pub fn resolve(raw: RawConfig, config_root: Option<&Path>) -> Result<Self, ConfigError> {
        let fields = raw.fields.unwrap_or_default();
        let order_by = raw.order_by.unwrap_or_default();
        let morphology = raw.morphology.unwrap_or_default();
        let synonyms = raw.synonyms.unwrap_or_default();
        let spellcheck = raw.spellcheck.unwrap_or_default();
        let doi = raw.doi.unwrap_or_default();
        let markers = raw.markers.unwrap_or_default();
        let exact_match = raw.exact_match.unwrap_or_default();
        let pipeline = raw.pipeline.unwrap_or_default();

        let mut synonym_sets = synonyms.sets.unwrap_or_default();
        for file in synonyms.files.unwrap_or_default() {
            let path = resolve_data_path(&file, config_root)?;
            synonym_sets.extend(SynonymSets::read_list(&path)?);
        }

        let mut dictionary = spellcheck.dictionary.unwrap_or_default();
        for file in spellcheck.files.unwrap_or_default() {
            let path = resolve_data_path(&file, config_root)?;
            for (word, count) in read_dictionary(&path)? {
                *dictionary.entry(word).or_default() += count;
            }
        }

        let defaults = Self::default();
        Ok(Self {
            language: raw.language.map(|l| l.to_lowercase()),
            blank: raw.blank.unwrap_or_default(),
            fields: FieldSettings {
                valid: lowercase_set(fields.valid),
                invalid: lowercase_set(fields.invalid),
                strict: fields.strict.unwrap_or(defaults.fields.strict),
                aliases: lowercase_map(fields.aliases),
            },
            order_by: OrderBySettings {
                field: order_by
                    .field
                    .map(|f| f.to_lowercase())
                    .unwrap_or(defaults.order_by.field),
                valid: lowercase_set(order_by.valid),
                direction: order_by.direction.unwrap_or(defaults.order_by.direction),
                aliases: lowercase_map(order_by.aliases),
            },
            morphology: MorphologySettings {
                enabled: morphology.enabled.unwrap_or(defaults.morphology.enabled),
                accent: morphology.accent.unwrap_or(defaults.morphology.accent),
                score: parse_score("morphology.score", morphology.score)?
                    .unwrap_or(defaults.morphology.score),
                decreasing: morphology.decreasing.unwrap_or(defaults.morphology.decreasing),
            },
            synonyms: SynonymSets::new(synonym_sets)?,
            spellcheck: SpellcheckSettings {
                languages: spellcheck
                    .languages
                    .map(|langs| langs.into_iter().map(|l| l.to_lowercase()).collect())
                    .unwrap_or(defaults.spellcheck.languages),
                dictionary,
            },
            doi: DoiSettings {
                score: parse_score("doi.score", doi.score)?.unwrap_or(defaults.doi.score),
                field: doi.field.unwrap_or(defaults.doi.field),
                wildcard: doi.wildcard.unwrap_or(defaults.doi.wildcard),
            },
            markers: MarkerSettings {
                forced_clean: markers.forced_clean.unwrap_or_default().into_iter().collect(),
            },
            exact_match: ExactMatchSettings {
                field: exact_match.field,
                score: parse_score("exact_match.score", exact_match.score)?,
                slop: exact_match.slop.unwrap_or(defaults.exact_match.slop),
            },
            pipeline: PipelineSettings {
                text: pipeline.text.unwrap_or(defaults.pipeline.text),
                tree: pipeline.tree.unwrap_or(defaults.pipeline.tree),
            },
            config_root: config_root.map(Path::to_path_buf),
        })
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Aliases that resolve to names outside the valid set
    /// - Field or order-by passes without any valid names
    /// - Fields listed as both valid and invalid
    /// - A spellcheck pass without dictionary words
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// Synonym files and dictionary files are shown inlined as the sets and words they loaded.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|source| ConfigError::Serialize { source })
    }
}

/// `[fields]` settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldSettings {
    /// Field names accepted in `field:expr`.
    pub valid: BTreeSet<String>,
    /// Field names always rejected.
    pub invalid: BTreeSet<String>,
    /// Drop rejected fields instead of demoting them to plain words.
    pub strict: bool,
    /// Alias -> canonical field name.
    pub aliases: BTreeMap<String, String>,
}

/// `[order_by]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBySettings {
    /// Pseudo-field carrying the sort field.
    pub field: String,
    /// Sortable fields.
    pub valid: BTreeSet<String>,
    /// Direction recorded with the directive.
    pub direction: SortDirection,
    /// Alias -> canonical sort field.
    pub aliases: BTreeMap<String, String>,
}

impl Default for OrderBySettings {
    fn default() -> Self {
        Self {
            field: String::from("order_by"),
            valid: BTreeSet::new(),
            direction: SortDirection::Desc,
            aliases: BTreeMap::new(),
        }
    }
}

/// `[morphology]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct MorphologySettings {
    /// Derive word forms.
    pub enabled: bool,
    /// Add the accent-normalized alternate.
    pub accent: bool,
    /// Boost of derived forms.
    pub score: Decimal,
    /// Use `1/len(alternates)` instead of the fixed score.
    pub decreasing: bool,
}

impl Default for MorphologySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            accent: true,
            score: Decimal::new(65, 2),
            decreasing: false,
        }
    }
}

/// `[spellcheck]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct SpellcheckSettings {
    /// Languages to correct.
    pub languages: Vec<String>,
    /// Word -> frequency.
    pub dictionary: BTreeMap<String, u64>,
}

impl Default for SpellcheckSettings {
    fn default() -> Self {
        Self {
            languages: vec![String::from("en")],
            dictionary: BTreeMap::new(),
        }
    }
}

/// `[doi]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct DoiSettings {
    /// Boost of detected DOI clauses.
    pub score: Decimal,
    /// Field holding DOIs.
    pub field: String,
    /// Turn `10.xxxx/prefix*` words into prefix searches.
    pub wildcard: bool,
}

impl Default for DoiSettings {
    fn default() -> Self {
        Self {
            score: Decimal::ONE,
            field: String::from("doi"),
            wildcard: true,
        }
    }
}

/// `[markers]` settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkerSettings {
    /// Words that request unfiltered results.
    pub forced_clean: BTreeSet<String>,
}

/// `[exact_match]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct ExactMatchSettings {
    /// Field the phrase clause is scoped to.
    pub field: Option<String>,
    /// Fixed boost; the operand count is used when absent.
    pub score: Option<Decimal>,
    /// Slop of the phrase clause.
    pub slop: u32,
}

impl Default for ExactMatchSettings {
    fn default() -> Self {
        Self {
            field: None,
            score: None,
            slop: 1,
        }
    }
}

/// `[pipeline]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSettings {
    /// Text transformers, in order.
    pub text: Vec<TextStage>,
    /// Tree transformers, in order.
    pub tree: Vec<TreeStage>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            text: vec![
                TextStage::Clean,
                TextStage::Lower,
                TextStage::Despace,
                TextStage::UnmatchedParentheses,
            ],
            tree: vec![
                TreeStage::OrderBy,
                TreeStage::Field,
                TreeStage::Markers,
                TreeStage::Doi,
                TreeStage::Spellcheck,
                TreeStage::Synonyms,
                TreeStage::Morphology,
                TreeStage::ExactMatch,
                TreeStage::Tantivy,
                TreeStage::Optimizing,
            ],
        }
    }
}

/// Parses an optional score as a non-negative decimal.
fn parse_score(key: &str, raw: Option<RawScore>) -> Result<Option<Decimal>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = raw.as_text();
    match Decimal::from_str(&text) {
        Ok(score) if !score.is_sign_negative() => Ok(Some(score.normalize())),
        _ => Err(ConfigError::InvalidScore {
            key: key.to_string(),
            value: text,
        }),
    }
}

/// Reads a dictionary file: one `word` or `word count` per line, `#` starts a comment.
fn read_dictionary(path: &Path) -> Result<Vec<(String, u64)>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            continue;
        };
        let count = match parts.next() {
            None => 1,
            Some(count) => count
                .parse()
                .map_err(|_| ConfigError::InvalidDictionaryEntry {
                    path: path.to_path_buf(),
                    line: i + 1,
                })?,
        };
        if parts.next().is_some() {
            return Err(ConfigError::InvalidDictionaryEntry {
                path: path.to_path_buf(),
                line: i + 1,
            });
        }
        entries.push((word.to_lowercase(), count));
    }
    Ok(entries)
}

/// Lowercases an optional list of names into a set.
fn lowercase_set(names: Option<Vec<String>>) -> BTreeSet<String> {
    names
        .unwrap_or_default()
        .into_iter()
        .map(|n| n.to_lowercase())
        .collect()
}

/// Lowercases both sides of an optional alias table.
fn lowercase_map(aliases: Option<BTreeMap<String, String>>) -> BTreeMap<String, String> {
    aliases
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.blank, BlankQuery::All);
        assert!(config.language.is_none());
        assert_eq!(config.order_by.field, "order_by");
        assert_eq!(config.order_by.direction, SortDirection::Desc);
        assert_eq!(config.morphology.score.to_string(), "0.65");
        assert_eq!(config.doi.score, Decimal::ONE);
        assert_eq!(config.doi.field, "doi");
        assert_eq!(config.exact_match.slop, 1);
        assert_eq!(config.spellcheck.languages, vec!["en"]);
        assert_eq!(config.pipeline.tree.first(), Some(&TreeStage::OrderBy));
        assert_eq!(config.pipeline.tree.last(), Some(&TreeStage::Optimizing));
    }

    #[test]
    fn test_empty_string_resolves_to_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.pipeline.text.len(), 4);
        assert!(config.synonyms.is_empty());
        assert!(config.config_root.is_none());
    }

    #[test]
    fn test_names_are_lowercased() {
        let config = Config::from_toml_str(
            r#"
language = "EN"

[fields]
valid = ["Title"]
aliases = { T = "TITLE" }
"#,
        )
        .unwrap();
        assert_eq!(config.language.as_deref(), Some("en"));
        assert!(config.fields.valid.contains("title"));
        assert_eq!(config.fields.aliases.get("t").unwrap(), "title");
    }

    #[test]
    fn test_scores_are_normalized() {
        let config = Config::from_toml_str(
            r#"
[morphology]
score = "0.500"

[exact_match]
score = 3.0
"#,
        )
        .unwrap();
        assert_eq!(config.morphology.score.to_string(), "0.5");
        assert_eq!(config.exact_match.score.unwrap().to_string(), "3");
    }

    #[test]
    fn test_invalid_score_rejected() {
        let err = Config::from_toml_str("[doi]\nscore = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScore { ref key, .. } if key == "doi.score"));

        let err = Config::from_toml_str("[morphology]\nscore = -1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScore { .. }));
    }

    #[test]
    fn test_inline_synonyms() {
        let config = Config::from_toml_str(
            r#"
[synonyms]
sets = [["aspirin", "acetylsalicylic acid"], ["dog", "hound"]]
"#,
        )
        .unwrap();
        assert_eq!(config.synonyms.len(), 2);
        assert!(config.synonyms.get("hound").is_some());
    }

    #[test]
    fn test_overlapping_inline_synonyms_rejected() {
        let err = Config::from_toml_str("[synonyms]\nsets = [[\"a\", \"b\"], [\"b\", \"c\"]]")
            .unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingSynonyms { .. }));
    }

    #[test]
    fn test_settings_to_toml() {
        let config = Config::from_toml_str(
            r#"
[fields]
valid = ["title"]

[markers]
forced_clean = "!clean"
"#,
        )
        .unwrap();
        let toml = config.settings_to_toml().unwrap();

        assert!(toml.contains("[fields]"));
        assert!(toml.contains("[morphology]"));
        assert!(toml.contains("score = \"0.65\""));
        assert!(toml.contains("\"!clean\""));

        let parsed: toml::Value =
            toml::from_str(&toml).expect("settings_to_toml should produce valid TOML");
        assert!(parsed.get("pipeline").is_some());
        assert_eq!(
            parsed["blank"].as_str(),
            Some("all"),
            "blank query is rendered by name"
        );
    }
}
