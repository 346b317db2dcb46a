//! Error types for query parsing and compilation.
//!
//! The lexer never fails, so there are two failure points: the parser, which rejects token
//! sequences it cannot reduce, and the compiler, which rejects tree shapes that have no
//! structured-query counterpart.

use std::{error::Error, fmt};

use thiserror::Error;

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Byte position of the offending token, `None` when the input ended prematurely.
    pub position: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Creates the error raised when the token stream is exhausted mid-rule.
    pub fn end_of_input() -> Self {
        Self::new(
            "unexpected end of input (maybe due to unmatched parenthesis)",
            None,
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} at position {}", self.message, pos),
            None => write!(f, "{} at the end", self.message),
        }
    }
}

impl Error for ParseError {}

/// Error raised while compiling a tree into a structured query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The expression has no structured-query mapping inside the given field.
    #[error("unsupported query: {expr} in search field `{field}`")]
    Unsupported {
        /// Canonical text of the offending subexpression.
        expr: String,
        /// Field the expression was scoped to.
        field: String,
    },
}

/// A unified error type for query parsing and compilation.
///
/// This type provides detailed error messages with context, including
/// the original query string and position indicators where applicable.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone)]
pub enum QueryErrorKind {
    /// Parser error (invalid syntax).
    Parse {
        /// Error message.
        message: String,
        /// Byte position in input, `None` at end of input.
        position: Option<usize>,
    },
    /// Compilation error (no structured-query mapping).
    Compile {
        /// Error message.
        message: String,
    },
}

impl QueryError {
    /// Creates a parse error.
    pub fn parse(
        message: impl Into<String>,
        position: Option<usize>,
        query: Option<String>,
    ) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: message.into(),
                position,
            },
            query,
        }
    }

    /// Creates a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Compile {
                message: message.into(),
            },
            query: None,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Parse { message, .. } | QueryErrorKind::Compile { message } => message,
        }
    }

    /// Returns true when this error came from the parser.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind, QueryErrorKind::Parse { .. })
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Parse { message, .. } if message.contains("end of input") => {
                Some("Check that every opening parenthesis or bracket is closed")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("'TO'") => {
                Some("Ranges are written as [from TO to] or {from TO to}")
            }
            QueryErrorKind::Compile { message } if message.contains("search field") => {
                Some("Fields accept words, phrases, regexes, ranges and groups of those")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Parse { .. } => "query syntax error",
            QueryErrorKind::Compile { .. } => "query error",
        };

        writeln!(f, "{}: {}", prefix, self.message())?;

        if let Some(query) = &self.query {
            writeln!(f, "  {}", query)?;
            let position = match &self.kind {
                QueryErrorKind::Parse { position, .. } => Some(position.unwrap_or(query.len())),
                QueryErrorKind::Compile { .. } => None,
            };
            if let Some(pos) = position {
                let clamped = query
                    .get(..pos.min(query.len()))
                    .map_or(0, |head| head.chars().count());
                writeln!(f, "  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self::parse(err.message, err.position, None)
    }
}

impl From<CompileError> for QueryError {
    fn from(err: CompileError) -> Self {
        Self::compile(err.to_string())
    }
}
