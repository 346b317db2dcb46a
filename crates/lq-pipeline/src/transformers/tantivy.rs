//! Backend-shape pass.

use lq_query::{Item, NodeKind};

use crate::{QueryContext, Rewrite, TreeTransformer};

/// Reshapes the tree into the form the search backend expects.
///
/// - A one-word phrase becomes a word; an empty phrase is removed
/// - `+(a b)` becomes `(+a +b)` and `-(a b)` becomes `(-a -b)`
/// - A field is pushed down through groups, `+`, `-` and boosts so it sits on the leaves
#[derive(Debug, Clone, Copy, Default)]
pub struct TantivyTransformer;

impl TantivyTransformer {
    /// Pushes the field `name` below `expr`.
    fn push_field(name: &str, expr: Item) -> Item {
        let scope = |operand| Item::field(name, operand);
        match expr {
            Item::Group(operands) => Item::Group(operands.into_iter().map(scope).collect()),
            Item::SynonymsGroup(operands) => {
                Item::SynonymsGroup(operands.into_iter().map(scope).collect())
            }
            Item::Plus(inner) => Item::plus(scope(*inner)),
            Item::Minus(inner) => Item::minus(scope(*inner)),
            Item::Boost { expr, score } => Item::Boost {
                expr: Box::new(scope(*expr)),
                score,
            },
            other => scope(other),
        }
    }
}

impl TreeTransformer for TantivyTransformer {
    fn name(&self) -> &'static str {
        "tantivy"
    }

    fn transform(&self, node: Item, parents: &[NodeKind], _: &mut QueryContext) -> Rewrite {
        match node {
            Item::Phrase(value) if parents.last() != Some(&NodeKind::Proximity) => {
                match value.split_whitespace().take(2).count() {
                    0 => Rewrite::remove(),
                    1 => Rewrite::keep(Item::word(value.trim())),
                    _ => Rewrite::keep(Item::Phrase(value)),
                }
            }
            Item::Plus(inner) => match *inner {
                Item::Group(operands) => {
                    Rewrite::keep(Item::Group(operands.into_iter().map(Item::plus).collect()))
                }
                other => Rewrite::keep(Item::plus(other)),
            },
            Item::Minus(inner) => match *inner {
                Item::Group(operands) | Item::SynonymsGroup(operands) => {
                    Rewrite::keep(Item::Group(operands.into_iter().map(Item::minus).collect()))
                }
                other => Rewrite::keep(Item::minus(other)),
            },
            Item::SearchField { name, expr } => Rewrite::keep(Self::push_field(&name, *expr)),
            other => Rewrite::keep(other),
        }
    }
}
