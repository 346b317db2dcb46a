//! Text transformers, applied to the raw query string before parsing.

use std::collections::BTreeSet;

use lq_config::TextStage;

/// A rewrite of the raw query text.
pub trait TextTransformer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the rewritten text.
    fn transform(&self, text: &str) -> String;
}

/// Returns the transformer for a configured stage.
pub fn text_transformer(stage: TextStage) -> Box<dyn TextTransformer> {
    match stage {
        TextStage::Clean => Box::new(Clean),
        TextStage::Lower => Box::new(Lower),
        TextStage::Despace => Box::new(Despace),
        TextStage::UnmatchedParentheses => Box::new(UnmatchedParentheses),
    }
}

/// Lowercases the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lower;

impl TextTransformer for Lower {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn transform(&self, text: &str) -> String {
        text.to_lowercase()
    }
}

/// Strips zero-width and control characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clean;

impl TextTransformer for Clean {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn transform(&self, text: &str) -> String {
        text.chars().filter(|&c| !is_hidden(c)).collect()
    }
}

/// Returns true for characters that render as nothing.
fn is_hidden(c: char) -> bool {
    matches!(
        c,
        '\u{00ad}' | '\u{200b}'..='\u{200f}' | '\u{2060}'..='\u{2064}' | '\u{feff}'
    ) || (c.is_control() && !c.is_whitespace())
}

/// Collapses whitespace runs to one space and trims the ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct Despace;

impl TextTransformer for Despace {
    fn name(&self) -> &'static str {
        "despace"
    }

    fn transform(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Drops brackets that have no counterpart.
///
/// Three kinds are tracked: `()`, `<>` and range brackets, where `[` and `{` both open and `]`
/// and `}` both close so that `[1 TO 5}` stays intact. A closer with no open bracket of its
/// kind is dropped, as is every opener still open at the end. Backslash-escaped brackets are
/// literal and never dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnmatchedParentheses;

impl TextTransformer for UnmatchedParentheses {
    fn name(&self) -> &'static str {
        "unmatched_parentheses"
    }

    fn transform(&self, text: &str) -> String {
        remove_unmatched_parens(text)
    }
}

/// Bracket kinds tracked by [`remove_unmatched_parens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    /// `(` and `)`.
    Round,
    /// `<` and `>`.
    Angle,
    /// `[` or `{` and `]` or `}`.
    Range,
}

impl Bracket {
    /// Classifies `c` as an opening or closing bracket.
    fn classify(c: char) -> Option<(Self, bool)> {
        match c {
            '(' => Some((Self::Round, true)),
            ')' => Some((Self::Round, false)),
            '<' => Some((Self::Angle, true)),
            '>' => Some((Self::Angle, false)),
            '[' | '{' => Some((Self::Range, true)),
            ']' | '}' => Some((Self::Range, false)),
            _ => None,
        }
    }

    /// Index into the per-kind stacks.
    fn slot(self) -> usize {
        match self {
            Self::Round => 0,
            Self::Angle => 1,
            Self::Range => 2,
        }
    }
}

/// Removes unmatched brackets in a single left-to-right scan.
pub fn remove_unmatched_parens(text: &str) -> String {
    let mut open: [Vec<usize>; 3] = Default::default();
    let mut dropped = BTreeSet::new();

    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        let Some((bracket, opening)) = Bracket::classify(c) else {
            continue;
        };
        let stack = &mut open[bracket.slot()];
        if opening {
            stack.push(i);
        } else if stack.pop().is_none() {
            dropped.insert(i);
        }
    }
    dropped.extend(open.into_iter().flatten());

    if dropped.is_empty() {
        return text.to_string();
    }
    text.char_indices()
        .filter(|(i, _)| !dropped.contains(i))
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_parens() {
        assert_eq!(remove_unmatched_parens("[[["), "");
        assert_eq!(remove_unmatched_parens("((term1"), "term1");
        assert_eq!(remove_unmatched_parens("((term1)))(term2"), "((term1))term2");
    }

    #[test]
    fn test_balanced_text_unchanged() {
        for text in [
            "(a b) c",
            "year:[1990 TO 2000}",
            "<a> (b [c])",
            "title:(rust go) -(x y)",
        ] {
            assert_eq!(remove_unmatched_parens(text), text);
        }
    }

    #[test]
    fn test_kinds_are_independent() {
        assert_eq!(remove_unmatched_parens("(a]"), "a");
        assert_eq!(remove_unmatched_parens("a) (b"), "a b");
        assert_eq!(remove_unmatched_parens("<x (y> z)"), "<x (y> z)");
    }

    #[test]
    fn test_escaped_brackets_are_literal() {
        assert_eq!(remove_unmatched_parens(r"\(a"), r"\(a");
        assert_eq!(remove_unmatched_parens(r"(a\)"), r"a\)");
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(remove_unmatched_parens("(ёлка «ель»"), "ёлка «ель»");
    }

    #[test]
    fn test_lower() {
        assert_eq!(Lower.transform("Search ENGINE Ёлка"), "search engine ёлка");
    }

    #[test]
    fn test_clean() {
        assert_eq!(
            Clean.transform("sea\u{200b}rch\u{feff} en\u{0007}gine\tx"),
            "search engine\tx"
        );
    }

    #[test]
    fn test_despace() {
        assert_eq!(Despace.transform("  search \t\n engine  "), "search engine");
        assert_eq!(Despace.transform("   "), "");
    }

    #[test]
    fn test_configured_stages() {
        let text = [TextStage::Clean, TextStage::Lower, TextStage::Despace]
            .into_iter()
            .map(text_transformer)
            .fold(String::from(" Search\u{200b}  Engine "), |text, t| {
                t.transform(&text)
            });
        assert_eq!(text, "search engine");
    }
}
