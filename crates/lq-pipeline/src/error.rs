//! Error types for the lq-pipeline crate.

use lq_query::{CompileError, QueryError};
use thiserror::Error;

/// Errors returned while processing a query.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The query did not parse after text transformation.
    #[error("failed to parse query '{query}': {}", source.message())]
    Parse {
        /// The query text that reached the parser.
        query: String,
        /// Underlying parser error, positioned against `query`.
        source: QueryError,
    },

    /// The rewritten tree has no structured query mapping.
    #[error("failed to compile query: {0}")]
    Compile(#[from] CompileError),
}

impl ProcessError {
    /// Returns true when the error came from the parser.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns a user-facing hint for the error, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Parse { source, .. } => source.suggestion(),
            Self::Compile(_) => None,
        }
    }
}
