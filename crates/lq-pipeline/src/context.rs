//! Per-query state shared by the transformer passes.

use lq_config::{BlankQuery, SortDirection};
use lq_query::StructuredQuery;
use time::{Date, Month, OffsetDateTime, error::ComponentRange};

/// A sort directive extracted from the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Canonical field to sort on.
    pub field: String,
    /// Sort direction.
    pub direction: SortDirection,
}

/// State collected while processing one query.
///
/// A fresh context is built for every call to
/// [`QueryProcessor::process`](crate::QueryProcessor::process); passes record what they find
/// here instead of encoding it in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// DOIs detected in the query, in order of appearance.
    pub dois: Vec<String>,
    /// Language of the query, detected or hinted.
    pub language: Option<String>,
    /// Weighted language candidates supplied by the caller.
    pub languages: Vec<(String, f32)>,
    /// Sort directive, if the query carried one.
    pub order_by: Option<OrderBy>,
    /// Whether the caller is browsing rather than looking for a known item.
    pub is_exploration: bool,
    /// Set when the query asked for unfiltered results.
    pub is_forced_clean: bool,
    /// Set when a field search was dropped as invalid.
    pub has_invalid_fields: bool,
    /// Point in time the query refers to, as a unix timestamp.
    pub point_of_time: Option<i64>,
    /// Query used when nothing is left to search for.
    pub blank: BlankQuery,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new(BlankQuery::default())
    }
}

impl QueryContext {
    /// Creates an empty context with the given blank-query policy.
    pub fn new(blank: BlankQuery) -> Self {
        Self {
            dois: Vec::new(),
            language: None,
            languages: Vec::new(),
            order_by: None,
            is_exploration: true,
            is_forced_clean: false,
            has_invalid_fields: false,
            point_of_time: None,
            blank,
        }
    }

    /// Returns true if the query expresses browsing intent that was not overridden.
    pub fn with_user_intent(&self) -> bool {
        self.is_exploration && !self.is_forced_clean
    }

    /// Sets the point in time to July 1 (UTC midnight) of `year`.
    pub fn set_point_of_time_year(&mut self, year: i32) -> Result<(), ComponentRange> {
        let date = Date::from_calendar_date(year, Month::July, 1)?;
        self.set_point_of_time(date.midnight().assume_utc());
        Ok(())
    }

    /// Sets the point in time.
    pub fn set_point_of_time(&mut self, at: OffsetDateTime) {
        self.point_of_time = Some(at.unix_timestamp());
    }

    /// Returns the query to run when the tree is empty.
    ///
    /// A query that lost invalid fields matches nothing rather than everything.
    pub fn blank_query(&self) -> StructuredQuery {
        if self.has_invalid_fields {
            return StructuredQuery::Empty {};
        }
        match self.blank {
            BlankQuery::All => StructuredQuery::All {},
            BlankQuery::Empty => StructuredQuery::Empty {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context() {
        let context = QueryContext::default();
        assert!(context.is_exploration);
        assert!(context.with_user_intent());
        assert!(context.dois.is_empty());
        assert_eq!(context.blank_query(), StructuredQuery::All {});
    }

    #[test]
    fn test_forced_clean_overrides_intent() {
        let mut context = QueryContext::default();
        context.is_forced_clean = true;
        assert!(!context.with_user_intent());
    }

    #[test]
    fn test_point_of_time_year() {
        let mut context = QueryContext::default();
        context.set_point_of_time_year(2020).unwrap();
        assert_eq!(context.point_of_time, Some(1_593_561_600));
        assert!(context.set_point_of_time_year(1_000_000).is_err());
    }

    #[test]
    fn test_blank_query_with_invalid_fields() {
        let mut context = QueryContext::new(BlankQuery::All);
        context.has_invalid_fields = true;
        assert_eq!(context.blank_query(), StructuredQuery::Empty {});

        let context = QueryContext::new(BlankQuery::Empty);
        assert_eq!(context.blank_query(), StructuredQuery::Empty {});
    }
}
