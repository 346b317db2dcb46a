//! Compilation of query trees into structured query documents.

use crate::{
    ast::Item,
    error::CompileError,
    lexer::unescape,
    structured::{Occur, RangeValue, StructuredQuery, Subquery},
};

impl Item {
    /// Compiles the tree into a structured query.
    ///
    /// Bare terms become free-text `match` clauses. Field-scoped terms become `term`,
    /// `phrase`, `regex` or `range` clauses; the field is distributed over groups and
    /// re-applied under `+`, `-` and boosts. Anything else inside a field fails with
    /// [`CompileError::Unsupported`].
    pub fn to_structured_query(&self) -> Result<StructuredQuery, CompileError> {
        compile(self)
    }
}

/// Compiles a node outside of any field.
fn compile(item: &Item) -> Result<StructuredQuery, CompileError> {
    Ok(match item {
        Item::Group(operands) => boolean(operands, compile)?,
        Item::SynonymsGroup(operands) => disjunction(operands, compile)?,
        Item::SearchField { name, expr } => compile_in_field(name, expr)?,
        Item::Boost { expr, score } => boost(compile(expr)?, score),
        Item::Plus(inner) => single(Occur::Must, compile(inner)?),
        Item::Minus(inner) => single(Occur::MustNot, compile(inner)?),
        Item::Word(_)
        | Item::Phrase(_)
        | Item::Regex(_)
        | Item::Doi(_)
        | Item::Url(_)
        | Item::Range { .. }
        | Item::Fuzzy { .. }
        | Item::Proximity { .. } => StructuredQuery::Match {
            value: item.to_string(),
        },
    })
}

/// Compiles `expr` scoped to the field `name`.
fn compile_in_field(name: &str, expr: &Item) -> Result<StructuredQuery, CompileError> {
    let in_field = |item: &Item| compile_in_field(name, item);
    let field = name.to_string();
    Ok(match expr {
        Item::Word(v) | Item::Doi(v) | Item::Url(v) => StructuredQuery::Term {
            field,
            value: unescape(v),
        },
        Item::Phrase(v) => StructuredQuery::Phrase {
            field,
            value: unescape(v),
            slop: None,
        },
        Item::Proximity { term, slop } if matches!(**term, Item::Phrase(_)) => {
            StructuredQuery::Phrase {
                field,
                value: term.unescaped_value().unwrap_or_default(),
                slop: Some(*slop),
            }
        }
        Item::Regex(v) => StructuredQuery::Regex {
            field,
            value: v.clone(),
        },
        Item::Range {
            left,
            right,
            include_left,
            include_right,
        } => StructuredQuery::Range {
            value: RangeValue {
                left: bound(name, left)?,
                right: bound(name, right)?,
                including_left: *include_left,
                including_right: *include_right,
            },
            field,
        },
        Item::Group(operands) => boolean(operands, in_field)?,
        Item::SynonymsGroup(operands) => disjunction(operands, in_field)?,
        Item::Boost { expr, score } => boost(in_field(expr)?, score),
        Item::Plus(inner) => single(Occur::Must, in_field(inner)?),
        Item::Minus(inner) => single(Occur::MustNot, in_field(inner)?),
        Item::SearchField { .. } | Item::Fuzzy { .. } | Item::Proximity { .. } => {
            return Err(unsupported(name, expr));
        }
    })
}

/// Returns the literal value of a range bound.
fn bound(name: &str, item: &Item) -> Result<String, CompileError> {
    match item {
        Item::Word(_) | Item::Phrase(_) | Item::Doi(_) | Item::Url(_) => {
            item.unescaped_value().ok_or_else(|| unsupported(name, item))
        }
        _ => Err(unsupported(name, item)),
    }
}

/// Builds a boolean clause; `+` and `-` operands set the occurrence of their clause.
fn boolean<F>(operands: &[Item], compile_operand: F) -> Result<StructuredQuery, CompileError>
where
    F: Fn(&Item) -> Result<StructuredQuery, CompileError>,
{
    if operands.is_empty() {
        return Ok(StructuredQuery::All {});
    }
    let subqueries = operands
        .iter()
        .map(|operand| {
            let (occur, inner) = match operand {
                Item::Plus(inner) => (Occur::Must, &**inner),
                Item::Minus(inner) => (Occur::MustNot, &**inner),
                other => (Occur::Should, other),
            };
            Ok(Subquery {
                occur,
                query: compile_operand(inner)?,
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;
    Ok(StructuredQuery::Boolean { subqueries })
}

/// Builds a disjunction-max clause.
fn disjunction<F>(operands: &[Item], compile_operand: F) -> Result<StructuredQuery, CompileError>
where
    F: Fn(&Item) -> Result<StructuredQuery, CompileError>,
{
    if operands.is_empty() {
        return Ok(StructuredQuery::All {});
    }
    let disjuncts = operands
        .iter()
        .map(compile_operand)
        .collect::<Result<Vec<_>, CompileError>>()?;
    Ok(StructuredQuery::DisjunctionMax { disjuncts })
}

/// Wraps a clause into a boost with a normalized score.
fn boost(query: StructuredQuery, score: &rust_decimal::Decimal) -> StructuredQuery {
    StructuredQuery::Boost {
        query: Box::new(query),
        score: score.normalize().to_string(),
    }
}

/// Wraps a clause into a one-clause boolean.
fn single(occur: Occur, query: StructuredQuery) -> StructuredQuery {
    StructuredQuery::Boolean {
        subqueries: vec![Subquery { occur, query }],
    }
}

/// Error for an expression that cannot be scoped to a field.
fn unsupported(name: &str, expr: &Item) -> CompileError {
    CompileError::Unsupported {
        expr: expr.to_string(),
        field: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn word(v: &str) -> Item {
        Item::word(v)
    }

    fn json_of(item: &Item) -> serde_json::Value {
        item.to_structured_query().unwrap().to_json()
    }

    #[test]
    fn bare_word_is_match() {
        assert_eq!(json_of(&word("rust")), json!({"match": {"value": "rust"}}));
    }

    #[test]
    fn boosted_field_term() {
        let item = Item::boost(
            Item::field("title", word("kolobok")),
            Decimal::from_str("3.0").unwrap(),
        );
        assert_eq!(
            json_of(&item),
            json!({"boost": {"query": {"term": {"field": "title", "value": "kolobok"}}, "score": "3"}})
        );
    }

    #[test]
    fn group_occurrences() {
        let item = Item::Group(vec![
            Item::minus(word("search")),
            Item::plus(word("engine")),
            word("fast"),
        ]);
        assert_eq!(
            json_of(&item),
            json!({"boolean": {"subqueries": [
                {"occur": "must_not", "query": {"match": {"value": "search"}}},
                {"occur": "must", "query": {"match": {"value": "engine"}}},
                {"occur": "should", "query": {"match": {"value": "fast"}}},
            ]}})
        );
    }

    #[test]
    fn lone_unary_is_single_clause() {
        assert_eq!(
            json_of(&Item::minus(word("x"))),
            json!({"boolean": {"subqueries": [{"occur": "must_not", "query": {"match": {"value": "x"}}}]}})
        );
    }

    #[test]
    fn synonyms_are_disjunction_max() {
        let item = Item::SynonymsGroup(vec![word("dog"), Item::phrase("good boy")]);
        assert_eq!(
            json_of(&item),
            json!({"disjunction_max": {"disjuncts": [
                {"match": {"value": "dog"}},
                {"match": {"value": "\"good boy\""}},
            ]}})
        );
    }

    #[test]
    fn field_distributes_over_group() {
        let item = Item::field(
            "title",
            Item::Group(vec![Item::plus(word("a")), Item::Phrase("b c".into())]),
        );
        assert_eq!(
            json_of(&item),
            json!({"boolean": {"subqueries": [
                {"occur": "must", "query": {"term": {"field": "title", "value": "a"}}},
                {"occur": "should", "query": {"phrase": {"field": "title", "value": "b c"}}},
            ]}})
        );
    }

    #[test]
    fn field_range_and_regex() {
        let range = Item::field(
            "year",
            Item::Range {
                left: Box::new(word("1992")),
                right: Box::new(word("1994")),
                include_left: true,
                include_right: false,
            },
        );
        assert_eq!(
            json_of(&range),
            json!({"range": {"field": "year", "value": {
                "left": "1992", "right": "1994", "including_left": true, "including_right": false
            }}})
        );
        assert_eq!(
            json_of(&Item::field("title", Item::Regex("pyth.*".into()))),
            json!({"regex": {"field": "title", "value": "pyth.*"}})
        );
    }

    #[test]
    fn field_proximity_carries_slop() {
        let item = Item::field(
            "title",
            Item::Proximity {
                term: Box::new(Item::phrase("search engine")),
                slop: 2,
            },
        );
        assert_eq!(
            json_of(&item),
            json!({"phrase": {"field": "title", "value": "search engine", "slop": 2}})
        );
    }

    #[test]
    fn field_term_is_unescaped() {
        assert_eq!(
            json_of(&Item::field("lang", word("c\\+\\+"))),
            json!({"term": {"field": "lang", "value": "c++"}})
        );
    }

    #[test]
    fn fuzzy_in_field_is_unsupported() {
        let item = Item::field(
            "title",
            Item::Fuzzy {
                term: Box::new(word("roam")),
                slop: Decimal::from_str("0.5").unwrap(),
            },
        );
        let err = item.to_structured_query().unwrap_err();
        assert_eq!(
            err,
            CompileError::Unsupported {
                expr: "roam~0.5".into(),
                field: "title".into(),
            }
        );
    }

    #[test]
    fn empty_group_matches_all() {
        assert_eq!(json_of(&Item::Group(vec![])), json!({"all": {}}));
    }
}
