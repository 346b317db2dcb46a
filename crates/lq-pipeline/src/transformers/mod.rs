//! Tree transformer passes.
//!
//! Each pass is a [`TreeTransformer`] run by [`rewrite_tree`](crate::rewrite_tree). The
//! production chain and its settings come from the `[pipeline]` section of the configuration;
//! [`tree_transformer`] builds one pass per configured stage.

mod doi;
mod exact_match;
mod field;
mod markers;
mod morphology;
mod optimizing;
mod order_by;
mod spellcheck;
mod synonyms;
mod tantivy;

use lq_config::{Config, TreeStage};
use lq_query::NodeKind;

pub use doi::DoiTransformer;
pub use exact_match::ExactMatchTransformer;
pub use field::FieldTransformer;
pub use markers::MarkerTransformer;
pub use morphology::MorphologyTransformer;
pub use optimizing::OptimizingTransformer;
pub use order_by::OrderByTransformer;
pub use spellcheck::SpellcheckTransformer;
pub use synonyms::SynonymTransformer;
pub use tantivy::TantivyTransformer;

use crate::{Ignoring, LanguageResources, TreeTransformer};

/// Builds the pass for `stage`.
///
/// Returns `None` for a spellcheck stage when no dictionary was loaded. Field-scoped terms are
/// never spell-corrected.
pub fn tree_transformer(
    stage: TreeStage,
    config: &Config,
    resources: &LanguageResources,
) -> Option<Box<dyn TreeTransformer>> {
    let pass: Box<dyn TreeTransformer> = match stage {
        TreeStage::OrderBy => Box::new(OrderByTransformer::new(config.order_by.clone())),
        TreeStage::Field => Box::new(FieldTransformer::new(config.fields.clone())),
        TreeStage::Markers => Box::new(MarkerTransformer::new(&config.markers.forced_clean)),
        TreeStage::Doi => Box::new(DoiTransformer::new(config.doi.clone())),
        TreeStage::Spellcheck => {
            let checker = resources.spell_checker.clone()?;
            Box::new(Ignoring::new(
                SpellcheckTransformer::new(checker, config.spellcheck.languages.clone()),
                [NodeKind::SearchField],
            ))
        }
        TreeStage::Morphology => Box::new(MorphologyTransformer::new(
            config.morphology.clone(),
            resources.morphologies.clone(),
        )),
        TreeStage::Synonyms => Box::new(SynonymTransformer::new(config.synonyms.clone())),
        TreeStage::ExactMatch => Box::new(ExactMatchTransformer::new(config.exact_match.clone())),
        TreeStage::Tantivy => Box::new(TantivyTransformer),
        TreeStage::Optimizing => Box::new(OptimizingTransformer),
    };
    Some(pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_stage_builds() {
        let mut config = Config::default();
        config.spellcheck.dictionary.insert("engine".to_string(), 1);
        let resources = LanguageResources::from_config(&config);
        let names: Vec<&str> = config
            .pipeline
            .tree
            .iter()
            .filter_map(|&stage| tree_transformer(stage, &config, &resources))
            .map(|pass| pass.name())
            .collect();
        assert_eq!(
            names,
            [
                "order_by",
                "field",
                "markers",
                "doi",
                "spellcheck",
                "synonyms",
                "morphology",
                "exact_match",
                "tantivy",
                "optimizing",
            ]
        );
    }

    #[test]
    fn test_spellcheck_skipped_without_dictionary() {
        let config = Config::default();
        let resources = LanguageResources::from_config(&config);
        assert!(tree_transformer(TreeStage::Spellcheck, &config, &resources).is_none());
    }
}
