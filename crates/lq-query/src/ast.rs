//! Query abstract syntax tree.
//!
//! Represents parsed query expressions before they are rewritten by transformer passes and
//! compiled into a [`StructuredQuery`](crate::StructuredQuery). Equality is structural: two
//! independently built trees with the same shape and values compare equal.

use std::fmt::{self, Write};

use rust_decimal::Decimal;

use crate::lexer::unescape;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    /// A bare word, escapes preserved.
    Word(String),

    /// A quoted phrase, quotes stripped.
    Phrase(String),

    /// A slash-delimited regular expression, slashes stripped.
    Regex(String),

    /// A DOI in lowercase `prefix/suffix` form.
    Doi(String),

    /// A URL.
    Url(String),

    /// Field-scoped query: search only within a specific field.
    SearchField {
        /// Field name, lowercase.
        name: String,
        /// Expression to match within that field.
        expr: Box<Self>,
    },

    /// Implicit combination of operands (boolean clauses).
    Group(Vec<Self>),

    /// Interchangeable alternatives; the best-scoring one wins.
    SynonymsGroup(Vec<Self>),

    /// Range between two bounds.
    Range {
        /// Lower bound (word or phrase).
        left: Box<Self>,
        /// Upper bound (word or phrase).
        right: Box<Self>,
        /// Whether the lower bound is included.
        include_left: bool,
        /// Whether the upper bound is included.
        include_right: bool,
    },

    /// Boosted query: multiplies the score of the inner expression.
    Boost {
        /// The expression to boost.
        expr: Box<Self>,
        /// Boost factor.
        score: Decimal,
    },

    /// Fuzzy match of a word.
    Fuzzy {
        /// The approximated word.
        term: Box<Self>,
        /// Edit distance.
        slop: Decimal,
    },

    /// Proximity match of a phrase.
    Proximity {
        /// The approximated phrase.
        term: Box<Self>,
        /// Allowed token distance.
        slop: u32,
    },

    /// Required occurrence.
    Plus(Box<Self>),

    /// Prohibited occurrence.
    Minus(Box<Self>),
}

/// The kind of an [`Item`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// [`Item::Word`].
    Word,
    /// [`Item::Phrase`].
    Phrase,
    /// [`Item::Regex`].
    Regex,
    /// [`Item::Doi`].
    Doi,
    /// [`Item::Url`].
    Url,
    /// [`Item::SearchField`].
    SearchField,
    /// [`Item::Group`].
    Group,
    /// [`Item::SynonymsGroup`].
    SynonymsGroup,
    /// [`Item::Range`].
    Range,
    /// [`Item::Boost`].
    Boost,
    /// [`Item::Fuzzy`].
    Fuzzy,
    /// [`Item::Proximity`].
    Proximity,
    /// [`Item::Plus`].
    Plus,
    /// [`Item::Minus`].
    Minus,
}

impl Item {
    /// Creates a word.
    pub fn word(value: impl Into<String>) -> Self {
        Self::Word(value.into())
    }

    /// Creates a phrase.
    pub fn phrase(value: impl Into<String>) -> Self {
        Self::Phrase(value.into())
    }

    /// Creates a field-scoped expression.
    pub fn field(name: impl Into<String>, expr: Self) -> Self {
        Self::SearchField {
            name: name.into(),
            expr: Box::new(expr),
        }
    }

    /// Creates a boosted expression. The score is normalized.
    pub fn boost(expr: Self, score: Decimal) -> Self {
        Self::Boost {
            expr: Box::new(expr),
            score: score.normalize(),
        }
    }

    /// Creates a required expression.
    pub fn plus(expr: Self) -> Self {
        Self::Plus(Box::new(expr))
    }

    /// Creates a prohibited expression.
    pub fn minus(expr: Self) -> Self {
        Self::Minus(Box::new(expr))
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Word(_) => NodeKind::Word,
            Self::Phrase(_) => NodeKind::Phrase,
            Self::Regex(_) => NodeKind::Regex,
            Self::Doi(_) => NodeKind::Doi,
            Self::Url(_) => NodeKind::Url,
            Self::SearchField { .. } => NodeKind::SearchField,
            Self::Group(_) => NodeKind::Group,
            Self::SynonymsGroup(_) => NodeKind::SynonymsGroup,
            Self::Range { .. } => NodeKind::Range,
            Self::Boost { .. } => NodeKind::Boost,
            Self::Fuzzy { .. } => NodeKind::Fuzzy,
            Self::Proximity { .. } => NodeKind::Proximity,
            Self::Plus(_) => NodeKind::Plus,
            Self::Minus(_) => NodeKind::Minus,
        }
    }

    /// Returns the raw value of a term node (word, phrase, regex, DOI or URL).
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Word(v) | Self::Phrase(v) | Self::Regex(v) | Self::Doi(v) | Self::Url(v) => {
                Some(v)
            }
            _ => None,
        }
    }

    /// Returns the value of a term node with literal escapes removed.
    pub fn unescaped_value(&self) -> Option<String> {
        self.value().map(unescape)
    }

    /// Returns the child nodes in order.
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Word(_) | Self::Phrase(_) | Self::Regex(_) | Self::Doi(_) | Self::Url(_) => {
                Vec::new()
            }
            Self::SearchField { expr, .. } | Self::Boost { expr, .. } => vec![expr],
            Self::Fuzzy { term, .. } | Self::Proximity { term, .. } => vec![term],
            Self::Plus(inner) | Self::Minus(inner) => vec![inner],
            Self::Group(operands) | Self::SynonymsGroup(operands) => operands.iter().collect(),
            Self::Range { left, right, .. } => vec![left, right],
        }
    }

    /// Rebuilds this node with every child passed through `f`.
    ///
    /// A child mapped to `None` is removed. Nodes that cannot exist without that child are
    /// removed as well, and a group that loses all of its operands becomes `None`.
    pub fn map_children<F>(self, mut f: F) -> Option<Self>
    where
        F: FnMut(Self) -> Option<Self>,
    {
        let node = match self {
            Self::Word(_) | Self::Phrase(_) | Self::Regex(_) | Self::Doi(_) | Self::Url(_) => self,
            Self::SearchField { name, expr } => Self::SearchField {
                name,
                expr: Box::new(f(*expr)?),
            },
            Self::Group(operands) => {
                let operands: Vec<Self> = operands.into_iter().filter_map(f).collect();
                if operands.is_empty() {
                    return None;
                }
                Self::Group(operands)
            }
            Self::SynonymsGroup(operands) => {
                let operands: Vec<Self> = operands.into_iter().filter_map(f).collect();
                if operands.is_empty() {
                    return None;
                }
                Self::SynonymsGroup(operands)
            }
            Self::Range {
                left,
                right,
                include_left,
                include_right,
            } => Self::Range {
                left: Box::new(f(*left)?),
                right: Box::new(f(*right)?),
                include_left,
                include_right,
            },
            Self::Boost { expr, score } => Self::Boost {
                expr: Box::new(f(*expr)?),
                score,
            },
            Self::Fuzzy { term, slop } => Self::Fuzzy {
                term: Box::new(f(*term)?),
                slop,
            },
            Self::Proximity { term, slop } => Self::Proximity {
                term: Box::new(f(*term)?),
                slop,
            },
            Self::Plus(inner) => Self::Plus(Box::new(f(*inner)?)),
            Self::Minus(inner) => Self::Minus(Box::new(f(*inner)?)),
        };
        Some(node)
    }

    /// Formats the expression as an indented tree, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.fmt_tree(&mut out, 0);
        out
    }

    /// Writes the tree form with the given indentation level.
    fn fmt_tree(&self, out: &mut String, indent: usize) {
        let prefix = "  ".repeat(indent);
        // Writing to a String cannot fail.
        let _ = match self {
            Self::Word(v) => writeln!(out, "{prefix}Word({v:?})"),
            Self::Phrase(v) => writeln!(out, "{prefix}Phrase({v:?})"),
            Self::Regex(v) => writeln!(out, "{prefix}Regex({v:?})"),
            Self::Doi(v) => writeln!(out, "{prefix}Doi({v:?})"),
            Self::Url(v) => writeln!(out, "{prefix}Url({v:?})"),
            Self::SearchField { name, .. } => writeln!(out, "{prefix}SearchField({name:?})"),
            Self::Group(_) => writeln!(out, "{prefix}Group"),
            Self::SynonymsGroup(_) => writeln!(out, "{prefix}SynonymsGroup"),
            Self::Range {
                include_left,
                include_right,
                ..
            } => writeln!(out, "{prefix}Range({include_left}, {include_right})"),
            Self::Boost { score, .. } => writeln!(out, "{prefix}Boost({})", score.normalize()),
            Self::Fuzzy { slop, .. } => writeln!(out, "{prefix}Fuzzy({})", slop.normalize()),
            Self::Proximity { slop, .. } => writeln!(out, "{prefix}Proximity({slop})"),
            Self::Plus(_) => writeln!(out, "{prefix}Plus"),
            Self::Minus(_) => writeln!(out, "{prefix}Minus"),
        };
        for child in self.children() {
            child.fmt_tree(out, indent + 1);
        }
    }
}

/// Writes space-separated operands in parentheses.
fn fmt_operands(f: &mut fmt::Formatter<'_>, operands: &[Item]) -> fmt::Result {
    f.write_char('(')?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{operand}")?;
    }
    f.write_char(')')
}

/// Canonical query-string form. Parsing it yields an equal tree.
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(v) | Self::Doi(v) | Self::Url(v) => f.write_str(v),
            Self::Phrase(v) => write!(f, "\"{v}\""),
            Self::Regex(v) => write!(f, "/{}/", v.replace('/', "\\/")),
            Self::SearchField { name, expr } => write!(f, "{name}:{expr}"),
            Self::Group(operands) | Self::SynonymsGroup(operands) => fmt_operands(f, operands),
            Self::Range {
                left,
                right,
                include_left,
                include_right,
            } => write!(
                f,
                "{}{left} TO {right}{}",
                if *include_left { '[' } else { '{' },
                if *include_right { ']' } else { '}' },
            ),
            Self::Boost { expr, score } => write!(f, "{expr}^{}", score.normalize()),
            Self::Fuzzy { term, slop } => write!(f, "{term}~{}", slop.normalize()),
            Self::Proximity { term, slop } => write!(f, "{term}~{slop}"),
            Self::Plus(inner) => write!(f, "+{inner}"),
            Self::Minus(inner) => write!(f, "-{inner}"),
        }
    }
}
