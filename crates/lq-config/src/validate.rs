//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::{Config, TreeStage};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// An alias points at a name outside the valid set of its section.
    AliasTargetNotValid {
        /// Section holding the alias (`fields` or `order_by`).
        section: String,
        /// The alias.
        alias: String,
        /// The name it resolves to.
        target: String,
    },
    /// The field pass is enabled but no field is valid, so every field search is rejected.
    NoValidFields,
    /// A field is listed as both valid and invalid; the deny list wins.
    FieldValidAndInvalid {
        /// The field name.
        field: String,
    },
    /// The order-by pass is enabled but no field is sortable.
    NoSortableFields,
    /// The spellcheck pass is enabled without any dictionary words.
    EmptyDictionary,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AliasTargetNotValid {
                section,
                alias,
                target,
            } => write!(
                f,
                "[{section}] alias '{alias}' points to '{target}', which is not a valid field"
            ),
            Self::NoValidFields => {
                write!(f, "no valid fields are defined; every field search will be rejected")
            }
            Self::FieldValidAndInvalid { field } => {
                write!(f, "field '{field}' is listed as both valid and invalid")
            }
            Self::NoSortableFields => {
                write!(f, "order_by is enabled but no sortable fields are defined")
            }
            Self::EmptyDictionary => {
                write!(f, "spellcheck is enabled but the dictionary is empty")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// Checks only apply to passes that appear in the tree pipeline.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let enabled = |stage: TreeStage| config.pipeline.tree.contains(&stage);

    if enabled(TreeStage::Field) {
        let fields = &config.fields;
        if fields.valid.is_empty() {
            warnings.push(ConfigWarning::NoValidFields);
        }
        for field in fields.valid.intersection(&fields.invalid) {
            warnings.push(ConfigWarning::FieldValidAndInvalid {
                field: field.clone(),
            });
        }
        if !fields.valid.is_empty() {
            for (alias, target) in &fields.aliases {
                if !fields.valid.contains(target) {
                    warnings.push(ConfigWarning::AliasTargetNotValid {
                        section: "fields".into(),
                        alias: alias.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }

    if enabled(TreeStage::OrderBy) {
        let order_by = &config.order_by;
        if order_by.valid.is_empty() {
            warnings.push(ConfigWarning::NoSortableFields);
        }
        for (alias, target) in &order_by.aliases {
            if !order_by.valid.is_empty() && !order_by.valid.contains(target) {
                warnings.push(ConfigWarning::AliasTargetNotValid {
                    section: "order_by".into(),
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
    }

    if enabled(TreeStage::Spellcheck) && config.spellcheck.dictionary.is_empty() {
        warnings.push(ConfigWarning::EmptyDictionary);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let warnings = validate_config(&Config::default());
        assert!(warnings.contains(&ConfigWarning::NoValidFields));
        assert!(warnings.contains(&ConfigWarning::NoSortableFields));
        assert!(warnings.contains(&ConfigWarning::EmptyDictionary));
    }

    #[test]
    fn test_validate_alias_targets() {
        let mut config = Config::default();
        config.fields.valid.insert("title".into());
        config.fields.aliases.insert("t".into(), "title".into());
        config.fields.aliases.insert("a".into(), "author".into());

        let warnings = validate_config(&config);
        assert!(warnings.contains(&ConfigWarning::AliasTargetNotValid {
            section: "fields".into(),
            alias: "a".into(),
            target: "author".into(),
        }));
        assert!(!warnings.iter().any(|w| matches!(
            w,
            ConfigWarning::AliasTargetNotValid { alias, .. } if alias == "t"
        )));
    }

    #[test]
    fn test_validate_valid_and_invalid() {
        let mut config = Config::default();
        config.fields.valid.insert("year".into());
        config.fields.invalid.insert("year".into());
        assert!(
            validate_config(&config).contains(&ConfigWarning::FieldValidAndInvalid {
                field: "year".into()
            })
        );
    }

    #[test]
    fn test_disabled_passes_are_not_checked() {
        let mut config = Config::default();
        config.pipeline.tree = vec![TreeStage::Optimizing];
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning::AliasTargetNotValid {
            section: "order_by".into(),
            alias: "date".into(),
            target: "issued_at".into(),
        };
        assert_eq!(
            warning.to_string(),
            "[order_by] alias 'date' points to 'issued_at', which is not a valid field"
        );
        assert!(ConfigWarning::EmptyDictionary.to_string().contains("dictionary"));
    }
}
