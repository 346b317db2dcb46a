//! Synonym sets.
//!
//! A synonym set is a closed list of interchangeable terms. Every term belongs to at most one
//! set, so a lookup is unambiguous.

use std::{collections::HashMap, fs, path::Path};

use serde::Serialize;

use crate::ConfigError;

/// Synonym sets indexed by term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynonymSets {
    /// The sets, in load order.
    sets: Vec<Vec<String>>,
    /// Term -> index into `sets`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SynonymSets {
    /// Builds the index, rejecting sets that share a term.
    ///
    /// Terms are trimmed, empty terms and empty sets are skipped, and a term repeated inside
    /// one set is kept once.
    pub fn new<I>(sets: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut result = Self::default();
        for set in sets {
            result.insert(set)?;
        }
        Ok(result)
    }

    /// Adds one set.
    fn insert(&mut self, set: Vec<String>) -> Result<(), ConfigError> {
        let mut terms: Vec<String> = Vec::with_capacity(set.len());
        for term in set {
            let term = term.trim();
            if !term.is_empty() && !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }
        if terms.is_empty() {
            return Ok(());
        }

        let position = self.sets.len();
        for term in &terms {
            if let Some(&previous) = self.index.get(term) {
                return Err(ConfigError::OverlappingSynonyms {
                    term: term.clone(),
                    current: terms.join(", "),
                    previous: self.sets[previous].join(", "),
                });
            }
        }
        for term in &terms {
            self.index.insert(term.clone(), position);
        }
        self.sets.push(terms);
        Ok(())
    }

    /// Parses a synonym list: one comma-separated set per line, `#` starts a comment.
    pub fn parse_list(contents: &str) -> Vec<Vec<String>> {
        contents
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default())
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(',').map(|t| t.trim().to_string()).collect())
            .collect()
    }

    /// Reads and parses a synonym list file.
    pub fn read_list(path: &Path) -> Result<Vec<Vec<String>>, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_list(&contents))
    }

    /// Returns the set containing `term`.
    pub fn get(&self, term: &str) -> Option<&[String]> {
        self.index.get(term).map(|&i| self.sets[i].as_slice())
    }

    /// Returns the number of sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if there are no sets.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Iterates over the sets in load order.
    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.sets.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_lookup_returns_whole_set() {
        let sets = SynonymSets::new(vec![
            set(&["aspirin", "acetylsalicylic acid"]),
            set(&["dog", "hound"]),
        ])
        .unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(
            sets.get("acetylsalicylic acid").unwrap(),
            &["aspirin", "acetylsalicylic acid"]
        );
        assert!(sets.get("cat").is_none());
    }

    #[test]
    fn test_overlapping_sets_rejected() {
        let err = SynonymSets::new(vec![set(&["a", "b"]), set(&["c", "b"])]).unwrap_err();
        match err {
            ConfigError::OverlappingSynonyms {
                term,
                current,
                previous,
            } => {
                assert_eq!(term, "b");
                assert_eq!(current, "c, b");
                assert_eq!(previous, "a, b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicates_and_blanks_inside_set() {
        let sets = SynonymSets::new(vec![set(&[" a ", "a", "", "b"]), set(&[" "])]).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets.get("a").unwrap(), &["a", "b"]);
    }

    #[test]
    fn test_parse_list() {
        let contents = "# drugs\naspirin, acetylsalicylic acid\n\nibuprofen,advil # brand\n";
        assert_eq!(
            SynonymSets::parse_list(contents),
            vec![
                set(&["aspirin", "acetylsalicylic acid"]),
                set(&["ibuprofen", "advil"])
            ]
        );
    }
}
