//! Error types for lq configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration or data file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A score is not a non-negative decimal number.
    #[error("invalid score for {key}: '{value}'")]
    InvalidScore {
        /// Dotted key of the setting.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// A term appears in two different synonym sets.
    #[error("synonym sets [{current}] and [{previous}] overlap on '{term}'")]
    OverlappingSynonyms {
        /// The shared term.
        term: String,
        /// The set being added, comma-separated.
        current: String,
        /// The set already holding the term, comma-separated.
        previous: String,
    },

    /// A dictionary file line is neither `word` nor `word count`.
    #[error("invalid dictionary entry in {path} at line {line}")]
    InvalidDictionaryEntry {
        /// Path to the dictionary file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
    },

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// Failed to canonicalize a path.
    #[error("failed to resolve path {path}: {source}")]
    PathResolution {
        /// The path that could not be resolved.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to render settings as TOML.
    #[error("failed to serialize settings: {source}")]
    Serialize {
        /// Underlying TOML serialization error.
        source: ser::Error,
    },
}
