//! Exact-phrase boosting.

use lq_config::ExactMatchSettings;
use lq_query::{Item, NodeKind};
use rust_decimal::Decimal;

use crate::{QueryContext, Rewrite, TreeTransformer};

/// Adds a boosted phrase clause to groups of plain terms.
///
/// `a b c` becomes `a b c ("a b c"~slop)^score`, optionally scoped to a field. Operands must
/// be words, or synonyms groups whose first alternative is the original word or phrase. Without a
/// configured score the operand count is used.
#[derive(Debug, Clone, Default)]
pub struct ExactMatchTransformer {
    /// Field, score and slop.
    settings: ExactMatchSettings,
}

impl ExactMatchTransformer {
    /// Creates the pass.
    pub fn new(settings: ExactMatchSettings) -> Self {
        Self { settings }
    }

    /// Builds the boosted phrase clause.
    fn phrase_clause(&self, phrase: String, operands: usize) -> Item {
        let mut clause = Item::Proximity {
            term: Box::new(Item::Phrase(phrase)),
            slop: self.settings.slop,
        };
        if let Some(field) = &self.settings.field {
            clause = Item::field(field, clause);
        }
        let score = self
            .settings
            .score
            .unwrap_or_else(|| Decimal::from(operands));
        Item::boost(clause, score)
    }
}

/// Returns the literal text an operand stands for.
fn plain_text(item: &Item) -> Option<&str> {
    match item {
        Item::Word(value) => Some(value),
        Item::SynonymsGroup(alternatives) => match alternatives.first() {
            Some(Item::Word(value) | Item::Phrase(value)) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

impl TreeTransformer for ExactMatchTransformer {
    fn name(&self) -> &'static str {
        "exact_match"
    }

    fn transform(&self, node: Item, parents: &[NodeKind], _: &mut QueryContext) -> Rewrite {
        let scoped = parents.iter().any(|kind| {
            matches!(
                kind,
                NodeKind::SearchField | NodeKind::Minus | NodeKind::SynonymsGroup
            )
        });
        let Item::Group(mut operands) = node else {
            return Rewrite::keep(node);
        };
        if scoped || operands.len() < 2 {
            return Rewrite::keep(Item::Group(operands));
        }

        let phrase = operands
            .iter()
            .map(plain_text)
            .collect::<Option<Vec<_>>>()
            .map(|words| words.join(" "));
        match phrase {
            Some(phrase) => {
                let clause = self.phrase_clause(phrase, operands.len());
                operands.push(clause);
                Rewrite::finalize(Item::Group(operands))
            }
            None => Rewrite::keep(Item::Group(operands)),
        }
    }
}
