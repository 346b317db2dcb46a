//! Integration tests for lq-config.
//!
//! Tests the full configuration loading pipeline: parse -> resolve data files -> validate.

// Integration tests live outside cfg(test)
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use lq_config::{BlankQuery, Config, ConfigError, ConfigWarning, SortDirection, TreeStage};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_full_config() {
    let env = TestEnv::new();
    let path = env.create_file(
        "lq.toml",
        r#"
language = "en"
blank = "empty"

[fields]
valid = ["title", "author", "year", "doi"]
invalid = ["secret"]
aliases = { t = "title", au = "author" }

[order_by]
valid = ["issued_at"]
direction = "asc"
aliases = { date = "issued_at" }

[morphology]
score = "0.5"

[exact_match]
field = "title"
slop = 2

[pipeline]
tree = ["order_by", "field", "exact_match", "optimizing"]
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.language.as_deref(), Some("en"));
    assert_eq!(config.blank, BlankQuery::Empty);
    assert_eq!(config.fields.valid.len(), 4);
    assert!(config.fields.invalid.contains("secret"));
    assert_eq!(config.fields.aliases.get("au").unwrap(), "author");
    assert_eq!(config.order_by.direction, SortDirection::Asc);
    assert_eq!(config.order_by.aliases.get("date").unwrap(), "issued_at");
    assert_eq!(config.morphology.score.to_string(), "0.5");
    assert_eq!(config.exact_match.field.as_deref(), Some("title"));
    assert_eq!(config.exact_match.slop, 2);
    assert_eq!(config.pipeline.tree.len(), 4);
    assert_eq!(config.config_root.as_deref(), Some(env.path()));

    assert!(config.validate().is_empty());
}

#[test]
fn test_load_missing_file() {
    let env = TestEnv::new();
    let err = Config::load(&env.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_synonym_files_resolved_relative_to_config() {
    let env = TestEnv::new();
    env.create_file(
        "lists/drugs.csv",
        "# drugs\naspirin, acetylsalicylic acid\nibuprofen, advil\n",
    );
    env.create_file("lists/animals.csv", "dog, hound\n");
    let path = env.create_file(
        "conf/lq.toml",
        r#"
[synonyms]
sets = [["car", "automobile"]]
files = ["../lists/drugs.csv", "../lists/animals.csv"]
"#,
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.synonyms.len(), 4);
    assert_eq!(
        config.synonyms.get("advil").unwrap(),
        &["ibuprofen", "advil"]
    );
    assert!(config.synonyms.get("automobile").is_some());
}

#[test]
fn test_synonym_file_single_path() {
    let env = TestEnv::new();
    env.create_file("drugs.csv", "aspirin, acetylsalicylic acid\n");
    let path = env.create_file("lq.toml", "[synonyms]\nfiles = \"drugs.csv\"\n");

    let config = Config::load(&path).unwrap();
    assert_eq!(config.synonyms.len(), 1);
}

#[test]
fn test_synonym_files_overlap_with_inline_sets() {
    let env = TestEnv::new();
    env.create_file("drugs.csv", "aspirin, acetylsalicylic acid\n");
    let path = env.create_file(
        "lq.toml",
        "[synonyms]\nsets = [[\"aspirin\", \"asa\"]]\nfiles = \"drugs.csv\"\n",
    );

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::OverlappingSynonyms { ref term, .. } if term == "aspirin"
    ));
}

#[test]
fn test_missing_synonym_file() {
    let env = TestEnv::new();
    let path = env.create_file("lq.toml", "[synonyms]\nfiles = \"nope.csv\"\n");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::PathResolution { .. }));
}

#[test]
fn test_dictionary_files_merge_with_inline_words() {
    let env = TestEnv::new();
    env.create_file(
        "words.txt",
        "# frequency list\nengine 120\nsearch 300\nEngine 5\nkolobok\n",
    );
    let path = env.create_file(
        "lq.toml",
        r#"
[spellcheck]
files = "words.txt"

[spellcheck.dictionary]
search = 10
"#,
    );

    let config = Config::load(&path).unwrap();
    let dictionary = &config.spellcheck.dictionary;
    assert_eq!(dictionary.get("engine"), Some(&125));
    assert_eq!(dictionary.get("search"), Some(&310));
    assert_eq!(dictionary.get("kolobok"), Some(&1));
}

#[test]
fn test_invalid_dictionary_line() {
    let env = TestEnv::new();
    env.create_file("words.txt", "engine 120\nsearch many\n");
    let path = env.create_file("lq.toml", "[spellcheck]\nfiles = \"words.txt\"\n");

    let err = Config::load(&path).unwrap_err();
    match err {
        ConfigError::InvalidDictionaryEntry { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_validate_reports_bad_aliases() {
    let config = Config::from_toml_str(
        r#"
[fields]
valid = ["title"]
aliases = { t = "title", a = "author" }

[order_by]
valid = ["issued_at"]

[spellcheck]
dictionary = { engine = 1 }
"#,
    )
    .unwrap();

    assert_eq!(
        config.validate(),
        vec![ConfigWarning::AliasTargetNotValid {
            section: "fields".into(),
            alias: "a".into(),
            target: "author".into(),
        }]
    );
}

#[test]
fn test_validate_skips_passes_outside_pipeline() {
    let config = Config::from_toml_str("[pipeline]\ntree = [\"tantivy\", \"optimizing\"]").unwrap();
    assert_eq!(
        config.pipeline.tree,
        vec![TreeStage::Tantivy, TreeStage::Optimizing]
    );
    assert!(config.validate().is_empty());
}

#[test]
fn test_settings_round_trip_through_toml() {
    let env = TestEnv::new();
    let path = env.create_file(
        "lq.toml",
        r#"
[fields]
valid = ["title"]
strict = true

[synonyms]
sets = [["dog", "hound"]]

[doi]
score = 2
"#,
    );
    let config = Config::load(&path).unwrap();
    let rendered = config.settings_to_toml().unwrap();

    let reparsed = Config::from_toml_str(&rendered).unwrap();
    assert!(reparsed.fields.strict);
    assert!(reparsed.fields.valid.contains("title"));
    assert_eq!(reparsed.synonyms.get("dog").unwrap(), &["dog", "hound"]);
    assert_eq!(reparsed.doi.score.to_string(), "2");
    assert_eq!(reparsed.pipeline.tree, config.pipeline.tree);
}
