//! The structured query document consumed by the search engine.
//!
//! Serializes to nested JSON objects keyed by clause kind, e.g.
//! `{"boost": {"query": {"term": {"field": "title", "value": "rust"}}, "score": "3"}}`.

use serde::{Deserialize, Serialize};

/// A structured query clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredQuery {
    /// Matches every document.
    All {},
    /// Matches no document.
    Empty {},
    /// Free-text match over the default fields.
    Match {
        /// Query text.
        value: String,
    },
    /// Exact term in a field.
    Term {
        /// Field name.
        field: String,
        /// Term value.
        value: String,
    },
    /// Phrase in a field.
    Phrase {
        /// Field name.
        field: String,
        /// Phrase text.
        value: String,
        /// Allowed token distance.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slop: Option<u32>,
    },
    /// Regular expression over a field.
    Regex {
        /// Field name.
        field: String,
        /// Pattern.
        value: String,
    },
    /// Range over a field.
    Range {
        /// Field name.
        field: String,
        /// Bounds.
        value: RangeValue,
    },
    /// Boolean combination of clauses.
    Boolean {
        /// Clauses with their occurrence requirement.
        subqueries: Vec<Subquery>,
    },
    /// Best-scoring alternative among the disjuncts.
    DisjunctionMax {
        /// Alternatives.
        disjuncts: Vec<StructuredQuery>,
    },
    /// Score multiplier.
    Boost {
        /// Boosted clause.
        query: Box<StructuredQuery>,
        /// Decimal factor, as a normalized string.
        score: String,
    },
}

/// Range bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeValue {
    /// Lower bound.
    pub left: String,
    /// Upper bound.
    pub right: String,
    /// Whether the lower bound is included.
    pub including_left: bool,
    /// Whether the upper bound is included.
    pub including_right: bool,
}

/// A clause of a boolean query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subquery {
    /// Occurrence requirement.
    pub occur: Occur,
    /// The clause.
    pub query: StructuredQuery,
}

/// Participation requirement of a boolean clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause contributes to scoring when it matches.
    Should,
    /// The clause must not match.
    MustNot,
}

impl StructuredQuery {
    /// Serializes the document to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // Every variant maps onto plain JSON objects, strings and booleans.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
