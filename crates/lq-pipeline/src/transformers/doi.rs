//! DOI detection.

use lq_config::DoiSettings;
use lq_query::{Item, NodeKind, find_doi};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{QueryContext, Rewrite, TreeTransformer};

/// A DOI prefix followed by `*`, e.g. `10.1001/*` or `10.1001/jama.*`.
static DOI_WILDCARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(10\.\d{4,9}(?:/[-._;:/a-z0-9]*)?)\*$").expect("doi wildcard pattern is valid")
});

/// Turns DOIs into boosted searches on the DOI field.
///
/// Only top-level identifiers (directly under the root or a plain group) are rewritten; a DOI
/// already scoped by a field or an operator is left alone. URLs that embed a DOI count as
/// that DOI. Words ending in `*` after a DOI prefix become required prefix searches.
#[derive(Debug, Clone, Default)]
pub struct DoiTransformer {
    /// Target field, boost and wildcard switch.
    settings: DoiSettings,
}

impl DoiTransformer {
    /// Creates the pass.
    pub fn new(settings: DoiSettings) -> Self {
        Self { settings }
    }

    /// Builds the boosted DOI clause and records the DOI.
    fn doi_clause(&self, doi: String, context: &mut QueryContext) -> Item {
        debug!(%doi, "detected doi");
        context.dois.push(doi.clone());
        Item::boost(
            Item::field(&self.settings.field, Item::Doi(doi)),
            self.settings.score,
        )
    }

    /// Rewrites a DOI-prefix wildcard word.
    fn wildcard(&self, prefix: &str, parents: &[NodeKind]) -> Option<Item> {
        let search = Item::field(
            &self.settings.field,
            Item::Regex(format!("{}.*", regex::escape(prefix))),
        );
        match parents.last() {
            None | Some(NodeKind::Group) => Some(Item::plus(search)),
            Some(NodeKind::Plus | NodeKind::Minus) => Some(search),
            Some(_) => None,
        }
    }
}

/// Returns true for positions where an identifier stands on its own.
fn is_top_level(parents: &[NodeKind]) -> bool {
    matches!(parents.last(), None | Some(NodeKind::Group))
}

impl TreeTransformer for DoiTransformer {
    fn name(&self) -> &'static str {
        "doi"
    }

    fn transform(&self, node: Item, parents: &[NodeKind], context: &mut QueryContext) -> Rewrite {
        match node {
            Item::Doi(doi) if is_top_level(parents) => {
                Rewrite::finalize(self.doi_clause(doi, context))
            }
            Item::Url(url) => match find_doi(&url) {
                Some(doi) if is_top_level(parents) => {
                    Rewrite::finalize(self.doi_clause(doi, context))
                }
                _ => Rewrite::keep(Item::Url(url)),
            },
            Item::Word(value) if self.settings.wildcard => {
                let prefix = DOI_WILDCARD_RE
                    .captures(&value.to_lowercase())
                    .map(|caps| caps[1].to_string());
                match prefix.and_then(|prefix| self.wildcard(&prefix, parents)) {
                    Some(search) => Rewrite::finalize(search),
                    None => Rewrite::keep(Item::Word(value)),
                }
            }
            other => Rewrite::keep(other),
        }
    }
}
