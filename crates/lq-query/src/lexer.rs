//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser. The lexer is total: it
//! never fails, characters that cannot start any token are skipped, and stray operators
//! surrounded by whitespace are treated as noise.
//!
//! At every position the rules are tried in priority order: URL, DOI, term (or the reserved
//! word `TO`), phrase, regex, fuzzy/proximity suffix, boost suffix, structural characters.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

/// Quote glyphs accepted as phrase delimiters. All of them normalize to `"`.
pub const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '«', '»', '„', '`'];

/// Characters that may be escaped with a backslash inside terms.
const ESCAPABLE: &str = "+-&|!(){}[]^\"~*?:\\";

/// Characters that can never appear unescaped inside a term.
const TERM_STOP: &str = ":^\\~(){}[]";

/// Characters that cannot start a term (in addition to [`TERM_STOP`]).
const TERM_START_STOP: &str = "/,+-";

/// Anchored URL pattern.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?i:https?://|www\.)[^\s()\[\]{}<>^~"'“”‘«»„`]+"#)
        .expect("url pattern is valid")
});

/// Anchored DOI pattern: registrant prefix, optional spaces around the slash, suffix.
static DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(10\.\d{4,9})\s?/\s?([-._;:/a-zA-Z0-9]*[a-zA-Z0-9])")
        .expect("doi pattern is valid")
});

/// Unanchored DOI pattern used to find identifiers embedded in other text.
static DOI_SEARCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(10\.\d{4,9})\s?/\s?([-._;:/a-zA-Z0-9]*[a-zA-Z0-9])")
        .expect("doi pattern is valid")
});

/// The kind of a token, carrying its parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A URL.
    Url(String),
    /// A DOI, normalized to lowercase `prefix/suffix`.
    Doi(String),
    /// A bare word (escapes preserved).
    Term(String),
    /// A quoted phrase (quotes stripped, content preserved).
    Phrase(String),
    /// A slash-delimited regex (slashes stripped, `\/` unescaped).
    Regex(String),
    /// Fuzzy/proximity suffix `~N`, the number being optional.
    Approx(Option<Decimal>),
    /// Boost suffix `^N`, the number being optional.
    Boost(Option<Decimal>),
    /// Required-occurrence prefix `+`.
    Plus,
    /// Prohibited-occurrence prefix `-`.
    Minus,
    /// Field separator `:`.
    Colon,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// Opening range bracket: `[` (inclusive) or `{` (exclusive).
    LBracket {
        /// Whether the bound is inclusive.
        inclusive: bool,
    },
    /// Closing range bracket: `]` (inclusive) or `}` (exclusive).
    RBracket {
        /// Whether the bound is inclusive.
        inclusive: bool,
    },
    /// The reserved range word `TO` (or `to`).
    To,
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Kind and parsed value.
    pub kind: TokenKind,
    /// Source text the token was produced from.
    pub raw: String,
    /// Byte offset of the token in the input.
    pub position: usize,
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Current byte position in input.
    position: usize,
    /// The character immediately before `position`, if any.
    prev: Option<char>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            prev: None,
        }
    }

    /// Tokenizes the entire input.
    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            let ch = self.peek()?;
            if ch.is_whitespace() {
                self.advance(ch.len_utf8());
                continue;
            }

            let start = self.position;
            if let Some(kind) = self.read_token(ch) {
                return Some(Token {
                    kind,
                    raw: self.input[start..self.position].to_string(),
                    position: start,
                });
            }

            // Noise: drop the character and carry on.
            self.advance(ch.len_utf8());
        }
    }

    /// Tries every rule at the current position. Only advances on success.
    fn read_token(&mut self, ch: char) -> Option<TokenKind> {
        if let Some(url) = self.read_url() {
            return Some(TokenKind::Url(url));
        }
        if let Some(doi) = self.read_doi() {
            return Some(TokenKind::Doi(doi));
        }
        if is_term_start(ch) || (ch == '\\' && self.peek_nth(1).is_some()) {
            let term = self.read_term();
            if term == "TO" || term == "to" {
                return Some(TokenKind::To);
            }
            return Some(TokenKind::Term(term));
        }
        if QUOTES.contains(&ch) {
            return self.read_phrase().map(TokenKind::Phrase);
        }

        match ch {
            '/' => self.read_regex().map(TokenKind::Regex),
            '~' => {
                self.advance(1);
                Some(TokenKind::Approx(self.read_number()))
            }
            '^' => {
                self.advance(1);
                Some(TokenKind::Boost(self.read_number()))
            }
            '+' | '-' => {
                let followed = self.peek_nth(1).is_some_and(|c| !c.is_whitespace());
                if !followed {
                    return None;
                }
                self.advance(1);
                Some(if ch == '+' {
                    TokenKind::Plus
                } else {
                    TokenKind::Minus
                })
            }
            ':' => {
                let preceded = self.prev.is_some_and(|c| !c.is_whitespace());
                let followed = self.peek_nth(1).is_some_and(|c| !c.is_whitespace());
                if !(preceded && followed) {
                    return None;
                }
                self.advance(1);
                Some(TokenKind::Colon)
            }
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket { inclusive: true }),
            '{' => self.single(TokenKind::LBracket { inclusive: false }),
            ']' => self.single(TokenKind::RBracket { inclusive: true }),
            '}' => self.single(TokenKind::RBracket { inclusive: false }),
            _ => None,
        }
    }

    /// Consumes a one-byte structural character.
    fn single(&mut self, kind: TokenKind) -> Option<TokenKind> {
        self.advance(1);
        Some(kind)
    }

    /// Reads a URL if one starts here.
    fn read_url(&mut self) -> Option<String> {
        let found = URL_RE.find(self.rest())?;
        let url = found.as_str().to_string();
        self.advance(found.end());
        Some(url)
    }

    /// Reads a DOI if one starts here and ends on a term boundary.
    fn read_doi(&mut self) -> Option<String> {
        let caps = DOI_RE.captures(self.rest())?;
        let end = caps.get(0)?.end();
        if self.rest()[end..].chars().next().is_some_and(is_term_char) {
            return None;
        }
        let doi = format!("{}/{}", &caps[1], &caps[2]).to_lowercase();
        self.advance(end);
        Some(doi)
    }

    /// Reads a term, keeping escape sequences verbatim.
    fn read_term(&mut self) -> String {
        let mut term = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                let Some(escaped) = self.peek_nth(1) else {
                    break;
                };
                term.push(ch);
                term.push(escaped);
                self.advance(ch.len_utf8() + escaped.len_utf8());
            } else if is_term_char(ch) {
                term.push(ch);
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
        term
    }

    /// Reads a quoted phrase. Unclosed quotes produce nothing.
    fn read_phrase(&mut self) -> Option<String> {
        let mut chars = self.rest().char_indices();
        chars.next(); // opening quote
        let mut content = String::new();
        while let Some((offset, ch)) = chars.next() {
            if ch == '\\' {
                let (_, escaped) = chars.next()?;
                content.push(ch);
                content.push(normalize_quote(escaped));
            } else if QUOTES.contains(&ch) {
                self.advance(offset + ch.len_utf8());
                return Some(content);
            } else {
                content.push(ch);
            }
        }
        None
    }

    /// Reads a slash-delimited regex. Unclosed regexes produce nothing.
    fn read_regex(&mut self) -> Option<String> {
        let mut chars = self.rest().char_indices();
        chars.next(); // opening slash
        let mut content = String::new();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                '\\' => {
                    let (_, escaped) = chars.next()?;
                    if escaped != '/' {
                        content.push(ch);
                    }
                    content.push(escaped);
                }
                '/' => {
                    self.advance(offset + 1);
                    return Some(content);
                }
                _ => content.push(ch),
            }
        }
        None
    }

    /// Reads the optional `[0-9.]+` degree after `~` or `^`.
    ///
    /// A degree that is not a valid decimal is left in the input and lexes as a term.
    fn read_number(&mut self) -> Option<Decimal> {
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return None;
        }
        let number = Decimal::from_str(&self.input[self.position..self.position + len]).ok()?;
        self.advance(len);
        Some(number)
    }

    /// Returns the unconsumed input.
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// Returns the current character without consuming it.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the character `n` positions ahead without consuming anything.
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Advances by `len` bytes.
    fn advance(&mut self, len: usize) {
        let consumed = &self.input[self.position..self.position + len];
        if let Some(last) = consumed.chars().last() {
            self.prev = Some(last);
        }
        self.position += len;
    }
}

/// Returns true if `ch` may start an unescaped term.
fn is_term_start(ch: char) -> bool {
    is_term_char(ch) && !TERM_START_STOP.contains(ch)
}

/// Returns true if `ch` may continue an unescaped term.
fn is_term_char(ch: char) -> bool {
    !ch.is_whitespace() && !TERM_STOP.contains(ch) && !QUOTES.contains(&ch)
}

/// Maps any accepted quote glyph to `"`.
fn normalize_quote(ch: char) -> char {
    if QUOTES.contains(&ch) { '"' } else { ch }
}

/// Tokenizes a query string.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

/// Removes the backslashes of literal escapes (`\+`, `\:`, `\\`, ...).
///
/// Backslashes before any other character are kept.
pub fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\'
            && let Some(&next) = chars.peek()
            && ESCAPABLE.contains(next)
        {
            result.push(next);
            chars.next();
            continue;
        }
        result.push(ch);
    }
    result
}

/// Finds a DOI anywhere in `text`, returned as lowercase `prefix/suffix`.
pub fn find_doi(text: &str) -> Option<String> {
    let caps = DOI_SEARCH_RE.captures(text)?;
    Some(format!("{}/{}", &caps[1], &caps[2]).to_lowercase())
}
