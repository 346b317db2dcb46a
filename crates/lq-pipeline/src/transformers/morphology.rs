//! Morphological expansion pass.

use std::{collections::HashMap, sync::Arc};

use lq_config::MorphologySettings;
use lq_query::{Item, NodeKind};
use rust_decimal::Decimal;

use crate::{Morphology, QueryContext, Rewrite, TreeTransformer};

/// Expands words into their alternate forms.
///
/// `word` becomes `(word | accent-free word | form^score ...)`. The result is final so the
/// generated forms are not expanded again. Range bounds and fuzzy terms are left alone, as
/// are words without letters.
pub struct MorphologyTransformer {
    /// Switches and form weight.
    settings: MorphologySettings,
    /// Engines by language code.
    engines: HashMap<String, Arc<dyn Morphology>>,
}

impl MorphologyTransformer {
    /// Creates the pass.
    pub fn new(settings: MorphologySettings, engines: HashMap<String, Arc<dyn Morphology>>) -> Self {
        Self { settings, engines }
    }

    /// Boost of each derived form, given how many there are.
    fn form_score(&self, count: usize) -> Decimal {
        if self.settings.decreasing {
            (Decimal::ONE / Decimal::from(count)).round_dp(4)
        } else {
            self.settings.score
        }
    }

    /// Builds the alternatives for one word.
    fn expand(&self, value: String, language: Option<&str>) -> Item {
        if !value.chars().any(char::is_alphabetic) {
            return Item::Word(value);
        }

        let mut forms = Vec::new();
        if self.settings.accent && value.contains(['ё', 'Ё']) {
            forms.push(Item::Word(value.replace('ё', "е").replace('Ё', "Е")));
        }
        let engine = language.and_then(|l| self.engines.get(l));
        if let Some(engine) = engine.filter(|_| self.settings.enabled) {
            let derived: Vec<String> = engine
                .derive_forms(&value)
                .into_iter()
                .filter(|form| *form != value)
                .collect();
            if !derived.is_empty() {
                let score = self.form_score(derived.len());
                forms.extend(
                    derived
                        .into_iter()
                        .map(|form| Item::boost(Item::Word(form), score)),
                );
            }
        }

        if forms.is_empty() {
            return Item::Word(value);
        }
        forms.insert(0, Item::Word(value));
        Item::SynonymsGroup(forms)
    }
}

impl TreeTransformer for MorphologyTransformer {
    fn name(&self) -> &'static str {
        "morphology"
    }

    fn transform(&self, node: Item, _: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        match node {
            Item::Word(value) => Rewrite::finalize(self.expand(value, context.language.as_deref())),
            Item::Range { .. } | Item::Fuzzy { .. } => Rewrite::finalize(node),
            other => Rewrite::keep(other),
        }
    }
}
