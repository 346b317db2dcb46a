//! Spelling correction pass.

use std::sync::Arc;

use lq_query::{Item, NodeKind};
use tracing::debug;

use crate::{QueryContext, Rewrite, SpellChecker, TreeTransformer};

/// Pairs misspelled words with their correction.
///
/// Words directly inside a group (or a lone word query) are checked when the query language
/// is one of the configured languages. A corrected word becomes `(original | corrected)`.
pub struct SpellcheckTransformer {
    /// Correction engine.
    checker: Arc<dyn SpellChecker>,
    /// Languages the engine applies to.
    languages: Vec<String>,
}

impl SpellcheckTransformer {
    /// Creates the pass.
    pub fn new(checker: Arc<dyn SpellChecker>, languages: Vec<String>) -> Self {
        Self { checker, languages }
    }

    /// Returns true if the query language is supported.
    fn applies(&self, context: &QueryContext) -> bool {
        context
            .language
            .as_deref()
            .is_some_and(|language| self.languages.iter().any(|l| l == language))
    }

    /// Corrects a single operand.
    fn correct(&self, node: Item) -> Item {
        let Item::Word(value) = node else {
            return node;
        };
        match self.checker.correct(&value) {
            Some(corrected) if corrected != value => {
                debug!(word = %value, %corrected, "spelling correction");
                Item::SynonymsGroup(vec![Item::Word(value), Item::Word(corrected)])
            }
            _ => Item::Word(value),
        }
    }
}

impl TreeTransformer for SpellcheckTransformer {
    fn name(&self) -> &'static str {
        "spellcheck"
    }

    fn transform(&self, node: Item, parents: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        if !self.applies(context) {
            return Rewrite::finalize(node);
        }
        match node {
            Item::Group(operands) => Rewrite::keep(Item::Group(
                operands.into_iter().map(|o| self.correct(o)).collect(),
            )),
            Item::Word(_) if parents.is_empty() => Rewrite::finalize(self.correct(node)),
            other => Rewrite::keep(other),
        }
    }
}
