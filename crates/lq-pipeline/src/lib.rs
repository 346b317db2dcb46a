//! Query rewriting pipeline for lq.
//!
//! A [`QueryProcessor`] takes raw user input through three stages:
//!
//! 1. **Text passes**: cleanup of the raw string (hidden characters, case, whitespace,
//!    unmatched brackets)
//! 2. **Parsing**: the cleaned string becomes an [`Item`](lq_query::Item) tree
//! 3. **Tree passes**: field validation, DOI detection, spelling, synonyms, morphology,
//!    phrase boosting and backend shaping
//!
//! Passes record what they learn in a per-query [`QueryContext`]. The result is a
//! [`ProcessedQuery`] that compiles into the structured query sent to the search backend.
//!
//! # Example
//!
//! ```
//! use lq_pipeline::{Lower, OptimizingTransformer, QueryProcessor};
//!
//! let processor = QueryProcessor::new()
//!     .with_text(Lower)
//!     .with_tree(OptimizingTransformer);
//! let processed = processor.process(Some("Search (Engine)"), None).unwrap();
//! assert_eq!(processed.query.unwrap().to_string(), "(search engine)");
//! ```

#![warn(missing_docs)]

mod context;
mod error;
mod language;
mod processor;
mod text;
mod transformers;
mod visitor;

pub use context::{OrderBy, QueryContext};
pub use error::ProcessError;
pub use language::{
    DictionarySpellChecker, EnglishMorphology, LanguageDetector, LanguageResources, Morphology,
    ScriptLanguageDetector, SpellChecker,
};
pub use processor::{ProcessedQuery, QueryProcessor};
pub use text::{
    Clean, Despace, Lower, TextTransformer, UnmatchedParentheses, remove_unmatched_parens,
    text_transformer,
};
pub use transformers::{
    DoiTransformer, ExactMatchTransformer, FieldTransformer, MarkerTransformer,
    MorphologyTransformer, OptimizingTransformer, OrderByTransformer, SpellcheckTransformer,
    SynonymTransformer, TantivyTransformer, tree_transformer,
};
pub use visitor::{Ignoring, Rewrite, Traversal, TreeTransformer, TreeVisitor, rewrite_tree, walk};
