//! Query orchestration: text passes, parsing, tree passes.

use std::sync::Arc;

use lq_config::{BlankQuery, Config};
use lq_query::{Item, NodeKind, StructuredQuery};
use tracing::{debug, debug_span, warn};

use crate::{
    LanguageDetector, LanguageResources, ProcessError, QueryContext, ScriptLanguageDetector,
    TextTransformer, TreeTransformer, TreeVisitor, rewrite_tree, text_transformer,
    tree_transformer, walk,
};

/// Runs a query through a chain of text and tree transformers.
///
/// A processor owns only read-only passes and resources, so one instance can be shared
/// between threads and used for many queries.
#[derive(Default)]
pub struct QueryProcessor {
    /// Passes over the raw query text, in order.
    text: Vec<Box<dyn TextTransformer>>,
    /// Passes over the parsed tree, in order.
    tree: Vec<Box<dyn TreeTransformer>>,
    /// Language detection, consulted before the caller's hint.
    detector: Option<Arc<dyn LanguageDetector>>,
    /// Language used when neither detection nor the caller names one.
    default_language: Option<String>,
    /// Query used when nothing is left to search for.
    blank: BlankQuery,
}

impl QueryProcessor {
    /// Creates a processor with no passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the configured chains with the default language resources.
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with(config, &LanguageResources::from_config(config))
    }

    /// Builds the configured chains with caller-supplied language resources.
    pub fn from_config_with(config: &Config, resources: &LanguageResources) -> Self {
        let text = config
            .pipeline
            .text
            .iter()
            .map(|&stage| text_transformer(stage))
            .collect();
        let tree = config
            .pipeline
            .tree
            .iter()
            .filter_map(|&stage| tree_transformer(stage, config, resources))
            .collect();
        Self {
            text,
            tree,
            detector: Some(Arc::new(ScriptLanguageDetector::default())),
            default_language: config.language.clone(),
            blank: config.blank,
        }
    }

    /// Appends a text pass.
    pub fn with_text(mut self, pass: impl TextTransformer + 'static) -> Self {
        self.text.push(Box::new(pass));
        self
    }

    /// Appends a tree pass.
    pub fn with_tree(mut self, pass: impl TreeTransformer + 'static) -> Self {
        self.tree.push(Box::new(pass));
        self
    }

    /// Sets the language detector.
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Sets the fallback language.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Sets the blank-query policy.
    pub fn with_blank(mut self, blank: BlankQuery) -> Self {
        self.blank = blank;
        self
    }

    /// Processes a query with an optional language hint.
    ///
    /// A missing or empty query yields an empty result with a fresh context. Parse failures
    /// are returned with the text that reached the parser.
    pub fn process(
        &self,
        query: Option<&str>,
        language: Option<&str>,
    ) -> Result<ProcessedQuery, ProcessError> {
        self.run(query, language, Vec::new())
    }

    /// Processes a query with weighted language candidates.
    ///
    /// The heaviest candidate acts as the language hint; all candidates are kept on the
    /// context.
    pub fn process_weighted(
        &self,
        query: Option<&str>,
        languages: &[(String, f32)],
    ) -> Result<ProcessedQuery, ProcessError> {
        let hint = languages
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(language, _)| language.as_str());
        self.run(query, hint, languages.to_vec())
    }

    /// Shared body of [`process`](Self::process) and
    /// [`process_weighted`](Self::process_weighted).
    fn run(
        &self,
        query: Option<&str>,
        hint: Option<&str>,
        languages: Vec<(String, f32)>,
    ) -> Result<ProcessedQuery, ProcessError> {
        let mut context = QueryContext::new(self.blank);
        context.languages = languages;

        let Some(query) = query.filter(|q| !q.is_empty()) else {
            context.language = self.fallback_language(hint);
            return Ok(ProcessedQuery::new(None, context));
        };

        let text = self
            .text
            .iter()
            .fold(query.to_string(), |text, pass| pass.transform(&text));
        context.language = self
            .detector
            .as_ref()
            .and_then(|detector| detector.detect(&text))
            .or_else(|| self.fallback_language(hint));

        let span = debug_span!("process", language = context.language.as_deref());
        let _entered = span.enter();
        debug!(query = %text, "text transformed");

        let parsed = lq_query::parse(&text).map_err(|source| {
            warn!(query = %text, error = %source.message(), "query failed to parse");
            ProcessError::Parse {
                query: text.clone(),
                source,
            }
        })?;

        let mut tree = parsed;
        for pass in &self.tree {
            let Some(root) = tree else {
                break;
            };
            tree = rewrite_tree(pass.as_ref(), root, &mut context);
            let rendered = tree.as_ref().map(ToString::to_string).unwrap_or_default();
            debug!(pass = pass.name(), tree = %rendered, "tree transformed");
        }
        Ok(ProcessedQuery::new(tree, context))
    }

    /// Returns the caller's hint, or the configured default.
    fn fallback_language(&self, hint: Option<&str>) -> Option<String> {
        hint.map(str::to_lowercase)
            .or_else(|| self.default_language.clone())
    }
}

/// A processed query: the rewritten tree and what the passes learned about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    /// Rewritten tree, `None` when nothing is left to search for.
    pub query: Option<Item>,
    /// Context collected while processing.
    pub context: QueryContext,
}

impl ProcessedQuery {
    /// Pairs a tree with its context.
    pub fn new(query: Option<Item>, context: QueryContext) -> Self {
        Self { query, context }
    }

    /// Returns true if there is nothing to search for.
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
    }

    /// Compiles the tree, or returns the blank query when it is empty.
    pub fn to_structured_query(&self) -> Result<StructuredQuery, ProcessError> {
        match &self.query {
            Some(item) => Ok(item.to_structured_query()?),
            None => Ok(self.context.blank_query()),
        }
    }

    /// Returns true if the query looks like browsing rather than a known-item lookup.
    ///
    /// Field searches, ranges, regexes and identifiers point at specific documents; a query
    /// made only of free words and phrases is exploratory.
    pub fn is_exploration_query(&self) -> bool {
        let Some(root) = &self.query else {
            return false;
        };
        if !self.context.dois.is_empty() {
            return false;
        }
        let mut finder = LookupFinder::default();
        walk(&mut finder, root);
        !finder.found
    }

    /// Returns the terms the query asks for, skipping excluded subtrees.
    pub fn positive_terms(&self) -> Vec<String> {
        let mut collector = TermCollector::default();
        if let Some(root) = &self.query {
            walk(&mut collector, root);
        }
        collector.terms
    }
}

/// Looks for nodes that target specific documents.
#[derive(Default)]
struct LookupFinder {
    /// Set once such a node is seen.
    found: bool,
}

impl TreeVisitor for LookupFinder {
    fn visit(&mut self, node: &Item, _: &[NodeKind]) {
        self.found |= matches!(
            node,
            Item::SearchField { .. }
                | Item::Range { .. }
                | Item::Regex(_)
                | Item::Doi(_)
                | Item::Url(_)
        );
    }

    fn prunes(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Minus
    }
}

/// Collects word and phrase values outside of `-` operands.
#[derive(Default)]
struct TermCollector {
    /// Values in order of appearance.
    terms: Vec<String>,
}

impl TreeVisitor for TermCollector {
    fn visit(&mut self, node: &Item, _: &[NodeKind]) {
        if let Item::Word(_) | Item::Phrase(_) = node
            && let Some(value) = node.unescaped_value()
        {
            self.terms.push(value);
        }
    }

    fn prunes(&self, kind: NodeKind) -> bool {
        kind == NodeKind::Minus
    }
}
