//! Tree simplification.

use lq_query::{Item, NodeKind};
use rust_decimal::Decimal;

use crate::{QueryContext, Rewrite, Traversal, TreeTransformer};

/// Flattens nested groups and drops neutral boosts.
///
/// Runs bottom-up, so a group sees children that are already flat and one splice per level
/// is enough. Running the pass twice gives the same tree as running it once.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizingTransformer;

impl TreeTransformer for OptimizingTransformer {
    fn name(&self) -> &'static str {
        "optimizing"
    }

    fn transform(&self, node: Item, _: &[NodeKind], _: &mut QueryContext) -> Rewrite {
        match node {
            Item::Group(operands) => {
                let mut flat = Vec::with_capacity(operands.len());
                for operand in operands {
                    match operand {
                        Item::Group(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                Rewrite::keep(Item::Group(flat))
            }
            Item::Boost { expr, score } if score == Decimal::ONE => Rewrite::keep(*expr),
            other => Rewrite::keep(other),
        }
    }

    fn traversal(&self) -> Traversal {
        Traversal::PostOrder
    }
}
