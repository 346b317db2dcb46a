//! Marker words.

use std::collections::BTreeSet;

use lq_query::{Item, NodeKind};

use crate::{QueryContext, Rewrite, TreeTransformer};

/// Removes marker words and records them in the context.
///
/// A forced-clean marker (e.g. `!clean`) asks for results without the exploration tweaks.
#[derive(Debug, Clone, Default)]
pub struct MarkerTransformer {
    /// Lowercase forced-clean markers.
    forced_clean: BTreeSet<String>,
}

impl MarkerTransformer {
    /// Creates the pass.
    pub fn new<I, S>(forced_clean: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            forced_clean: forced_clean
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl TreeTransformer for MarkerTransformer {
    fn name(&self) -> &'static str {
        "markers"
    }

    fn transform(&self, node: Item, _: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        match node {
            Item::Word(value) if self.forced_clean.contains(&value.to_lowercase()) => {
                context.is_forced_clean = true;
                Rewrite::remove()
            }
            other => Rewrite::keep(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite_tree;

    #[test]
    fn test_marker_removed_and_recorded() {
        let pass = MarkerTransformer::new(["!Clean"]);
        let mut context = QueryContext::default();
        let tree = lq_query::parse("kolobok !clean").unwrap().unwrap();

        let tree = rewrite_tree(&pass, tree, &mut context);
        assert_eq!(tree, Some(Item::Group(vec![Item::word("kolobok")])));
        assert!(context.is_forced_clean);
        assert!(!context.with_user_intent());
    }

    #[test]
    fn test_other_words_untouched() {
        let pass = MarkerTransformer::new(["!clean"]);
        let mut context = QueryContext::default();
        let tree = lq_query::parse("clean kolobok").unwrap().unwrap();

        let result = rewrite_tree(&pass, tree.clone(), &mut context);
        assert_eq!(result, Some(tree));
        assert!(!context.is_forced_clean);
    }
}
