//! Sort directive extraction.

use lq_config::OrderBySettings;
use lq_query::{Item, NodeKind};
use tracing::debug;

use crate::{OrderBy, QueryContext, Rewrite, TreeTransformer};

/// Moves `order_by:<field>` from the tree into the context.
///
/// Only sortable fields (after alias resolution) are taken; anything else is left in place
/// for the field pass to deal with.
#[derive(Debug, Clone, Default)]
pub struct OrderByTransformer {
    /// Pseudo-field name, sortable fields and aliases.
    settings: OrderBySettings,
}

impl OrderByTransformer {
    /// Creates the pass.
    pub fn new(settings: OrderBySettings) -> Self {
        Self { settings }
    }

    /// Returns the canonical sort field for `value`, if it is sortable.
    fn sort_field(&self, value: &str) -> Option<String> {
        let field = self
            .settings
            .aliases
            .get(value)
            .map_or(value, String::as_str);
        self.settings
            .valid
            .contains(field)
            .then(|| field.to_string())
    }
}

impl TreeTransformer for OrderByTransformer {
    fn name(&self) -> &'static str {
        "order_by"
    }

    fn transform(&self, node: Item, _: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        if let Item::SearchField { name, expr } = &node
            && *name == self.settings.field
            && let Item::Word(value) = expr.as_ref()
            && let Some(field) = self.sort_field(value)
        {
            debug!(%field, direction = self.settings.direction.as_str(), "recorded sort directive");
            context.order_by = Some(OrderBy {
                field,
                direction: self.settings.direction,
            });
            return Rewrite::remove();
        }
        Rewrite::keep(node)
    }
}

#[cfg(test)]
mod tests {
    use lq_config::SortDirection;

    use super::*;
    use crate::rewrite_tree;

    fn transformer() -> OrderByTransformer {
        let mut settings = OrderBySettings::default();
        settings.valid.insert("field1".to_string());
        settings.aliases.insert("f1".to_string(), "field1".to_string());
        OrderByTransformer::new(settings)
    }

    fn run(query: &str) -> (Option<Item>, QueryContext) {
        let mut context = QueryContext::default();
        let tree = lq_query::parse(query).unwrap().unwrap();
        (rewrite_tree(&transformer(), tree, &mut context), context)
    }

    #[test]
    fn test_alias_recorded_and_removed() {
        let (tree, context) = run("search order_by:f1");
        assert_eq!(tree, Some(Item::Group(vec![Item::word("search")])));
        assert_eq!(
            context.order_by,
            Some(OrderBy {
                field: "field1".to_string(),
                direction: SortDirection::Desc,
            })
        );
    }

    #[test]
    fn test_only_directive_leaves_empty_tree() {
        let (tree, context) = run("order_by:field1");
        assert_eq!(tree, None);
        assert!(context.order_by.is_some());
    }

    #[test]
    fn test_unsortable_field_left_in_place() {
        let (tree, context) = run("order_by:title");
        assert_eq!(tree, Some(Item::field("order_by", Item::word("title"))));
        assert!(context.order_by.is_none());
    }
}
