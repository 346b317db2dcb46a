//! Query parsing, AST and structured-query compilation for lq.
//!
//! The query language is Lucene-like:
//!
//! - **Words**: `rust` - free-text terms, combined by juxtaposition
//! - **Phrases**: `"error handling"` - quoted spans, several quote glyphs accepted
//! - **Occurrence**: `+required -prohibited`
//! - **Grouping**: `(a b) c` - precedence control
//! - **Fields**: `title:guide`, `title:(rust go)` - search specific fields
//! - **Ranges**: `year:[1992 TO 1994}` - inclusive `[]` or exclusive `{}` bounds
//! - **Regexes**: `/pyth.*/`
//! - **Approximation**: `roam~0.8`, `"search engine"~2`
//! - **Boosting**: `rust^2.5`
//! - **Identifiers**: DOIs (`10.1001/abc`) and URLs are recognised as single terms
//!
//! # Example
//!
//! ```
//! use lq_query::parse;
//!
//! let item = parse("title:kolobok^3").unwrap().unwrap();
//! let query = item.to_structured_query().unwrap();
//! assert_eq!(
//!     query.to_json().to_string(),
//!     r#"{"boost":{"query":{"term":{"field":"title","value":"kolobok"}},"score":"3"}}"#
//! );
//! ```

#![warn(missing_docs)]

mod ast;
mod compile;
mod error;
mod lexer;
mod parser;
mod structured;

pub use ast::{Item, NodeKind};
pub use error::{CompileError, ParseError, QueryError, QueryErrorKind};
pub use lexer::{QUOTES, Token, TokenKind, find_doi, tokenize, unescape};
pub use parser::parse;
pub use rust_decimal::Decimal;
pub use structured::{Occur, RangeValue, StructuredQuery, Subquery};
