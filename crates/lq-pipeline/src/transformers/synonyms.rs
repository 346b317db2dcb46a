//! Synonym expansion pass.

use lq_config::SynonymSets;
use lq_query::{Item, NodeKind, unescape};

use crate::{QueryContext, Rewrite, TreeTransformer};

/// Replaces a term with its whole synonym set.
///
/// Only top-level words and phrases (directly under the root or a plain group) are looked
/// up. A match becomes a final synonyms group of phrases, one per set member.
#[derive(Debug, Clone, Default)]
pub struct SynonymTransformer {
    /// Loaded synonym sets.
    sets: SynonymSets,
}

impl SynonymTransformer {
    /// Creates the pass.
    pub fn new(sets: SynonymSets) -> Self {
        Self { sets }
    }

    /// Returns the synonyms group for `term`, if it belongs to a set.
    fn expand(&self, term: &str) -> Option<Item> {
        let set = self.sets.get(&unescape(term))?;
        Some(Item::SynonymsGroup(set.iter().map(Item::phrase).collect()))
    }
}

impl TreeTransformer for SynonymTransformer {
    fn name(&self) -> &'static str {
        "synonyms"
    }

    fn transform(&self, node: Item, parents: &[NodeKind], _: &mut QueryContext) -> Rewrite {
        if !matches!(parents.last(), None | Some(NodeKind::Group)) {
            return Rewrite::keep(node);
        }
        let expanded = match &node {
            Item::Word(term) | Item::Phrase(term) => self.expand(term),
            _ => None,
        };
        match expanded {
            Some(group) => Rewrite::finalize(group),
            None => Rewrite::keep(node),
        }
    }
}
