//! Field name resolution.

use lq_config::FieldSettings;
use lq_query::{Item, NodeKind};
use tracing::debug;

use crate::{QueryContext, Rewrite, TreeTransformer};

/// Rewrites field aliases and rejects unknown fields.
///
/// A rejected `field:expr` becomes the plain group `(field expr)` so the text still counts.
/// In strict mode it is dropped and the context records that invalid fields were seen.
#[derive(Debug, Clone, Default)]
pub struct FieldTransformer {
    /// Valid, invalid and alias tables.
    settings: FieldSettings,
}

impl FieldTransformer {
    /// Creates the pass.
    pub fn new(settings: FieldSettings) -> Self {
        Self { settings }
    }

    /// Resolves an alias to its canonical field name.
    fn canonical(&self, name: String) -> String {
        match self.settings.aliases.get(&name) {
            Some(target) => target.clone(),
            None => name,
        }
    }

    /// Returns true if `name` may be searched.
    pub fn is_valid(&self, name: &str) -> bool {
        self.settings.valid.contains(name) && !self.settings.invalid.contains(name)
    }
}

impl TreeTransformer for FieldTransformer {
    fn name(&self) -> &'static str {
        "field"
    }

    fn transform(&self, node: Item, _: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        let Item::SearchField { name, expr } = node else {
            return Rewrite::keep(node);
        };

        let name = self.canonical(name);
        if self.is_valid(&name) {
            return Rewrite::keep(Item::SearchField { name, expr });
        }
        if self.settings.strict {
            debug!(field = %name, "dropping invalid field");
            context.has_invalid_fields = true;
            return Rewrite::remove();
        }
        debug!(field = %name, "demoting invalid field to text");
        Rewrite::keep(Item::Group(vec![Item::Word(name), *expr]))
    }
}
