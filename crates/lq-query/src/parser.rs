//! Query parser.
//!
//! Parses a token stream into a query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! expression     → postfix postfix*
//! postfix        → unary BOOST*
//! unary          → "+" unary | "-" unary
//!                | "(" expression ")"
//!                | ("[" | "{") phrase_or_term TO phrase_or_term ("]" | "}")
//!                | TERM ":" unary
//!                | TERM APPROX | PHRASE APPROX
//!                | TERM | PHRASE | REGEX | URL | DOI | TO
//! phrase_or_term → TERM | PHRASE
//! ```
//!
//! # Precedence (lowest to highest)
//!
//! 1. `-`, `+`
//! 2. Fuzzy/proximity suffix `~N`
//! 3. Boost suffix `^N`
//! 4. Grouping `(...)`, ranges, regexes, phrases, terms
//!
//! Juxtaposed expressions form one flat [`Item::Group`]. A group on the right absorbs the
//! expression before it, so `a (b c)` is `(a b c)`, while `(a b) c` keeps the inner group.

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    ast::Item,
    error::{ParseError, QueryError},
    lexer::{Token, TokenKind, tokenize},
};

/// Default edit distance of `term~`, in tenths.
const DEFAULT_FUZZY_SLOP_TENTHS: i64 = 5;

/// Default token distance of `"phrase"~`.
const DEFAULT_PROXIMITY_SLOP: u32 = 1;

/// Recursive descent parser for query expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<Option<Item>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_expression()?;

        if let Some(token) = self.peek() {
            return Err(unexpected(token));
        }

        Ok(Some(expr))
    }

    /// Parses: expression → postfix postfix*
    fn parse_expression(&mut self) -> Result<Item, ParseError> {
        let mut units = vec![self.parse_postfix()?];
        while self.can_start_unary() {
            units.push(self.parse_postfix()?);
        }

        let mut expr = units.pop().ok_or_else(ParseError::end_of_input)?;
        while let Some(unit) = units.pop() {
            expr = juxtapose(unit, expr);
        }
        Ok(expr)
    }

    /// Parses: postfix → unary BOOST*
    fn parse_postfix(&mut self) -> Result<Item, ParseError> {
        let mut expr = self.parse_unary()?;
        while let Some(TokenKind::Boost(score)) = self.peek_kind() {
            let score = score.unwrap_or(Decimal::ONE);
            self.advance();
            expr = Item::boost(expr, score);
        }
        Ok(expr)
    }

    /// Checks if the current token can start a unary expression.
    fn can_start_unary(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::LParen
                    | TokenKind::LBracket { .. }
                    | TokenKind::Term(_)
                    | TokenKind::Phrase(_)
                    | TokenKind::Regex(_)
                    | TokenKind::Url(_)
                    | TokenKind::Doi(_)
                    | TokenKind::To
            )
        )
    }

    /// Parses a unary expression.
    fn parse_unary(&mut self) -> Result<Item, ParseError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Plus => Ok(Item::plus(self.parse_unary()?)),
            TokenKind::Minus => Ok(Item::minus(self.parse_unary()?)),
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.expect(|kind| matches!(kind, TokenKind::RParen))?;
                Ok(match inner {
                    Item::Group(_) => inner,
                    other => Item::Group(vec![other]),
                })
            }
            TokenKind::LBracket { inclusive } => self.parse_range(inclusive),
            TokenKind::Term(value) => self.parse_term(value),
            TokenKind::Phrase(value) => {
                if let Some(TokenKind::Approx(slop)) = self.peek_kind() {
                    let slop = slop.map_or(DEFAULT_PROXIMITY_SLOP, |s| {
                        s.trunc().to_u32().unwrap_or(DEFAULT_PROXIMITY_SLOP)
                    });
                    self.advance();
                    return Ok(Item::Proximity {
                        term: Box::new(Item::Phrase(value)),
                        slop,
                    });
                }
                Ok(Item::Phrase(value))
            }
            TokenKind::Regex(value) => Ok(Item::Regex(value)),
            TokenKind::Url(value) => Ok(Item::Url(value)),
            TokenKind::Doi(value) => Ok(Item::Doi(value)),
            // TO is reserved only inside ranges.
            TokenKind::To => Ok(Item::Word(token.raw)),
            TokenKind::RParen
            | TokenKind::RBracket { .. }
            | TokenKind::Colon
            | TokenKind::Approx(_)
            | TokenKind::Boost(_) => Err(unexpected(&token)),
        }
    }

    /// Parses what follows a TERM: a field search, a fuzzy suffix, or nothing.
    fn parse_term(&mut self, value: String) -> Result<Item, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Colon) => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Item::field(value.to_lowercase(), expr))
            }
            Some(TokenKind::Approx(slop)) => {
                let slop = slop
                    .unwrap_or_else(|| Decimal::new(DEFAULT_FUZZY_SLOP_TENTHS, 1))
                    .normalize();
                self.advance();
                Ok(Item::Fuzzy {
                    term: Box::new(Item::Word(value)),
                    slop,
                })
            }
            _ => Ok(Item::Word(value)),
        }
    }

    /// Parses a range after its opening bracket.
    fn parse_range(&mut self, include_left: bool) -> Result<Item, ParseError> {
        let left = self.parse_phrase_or_term()?;
        self.expect(|kind| matches!(kind, TokenKind::To))?;
        let right = self.parse_phrase_or_term()?;
        let closing = self.expect(|kind| matches!(kind, TokenKind::RBracket { .. }))?;
        let include_right = matches!(closing.kind, TokenKind::RBracket { inclusive: true });
        Ok(Item::Range {
            left: Box::new(left),
            right: Box::new(right),
            include_left,
            include_right,
        })
    }

    /// Parses a range bound.
    fn parse_phrase_or_term(&mut self) -> Result<Item, ParseError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Term(value) => Ok(Item::Word(value)),
            TokenKind::Phrase(value) => Ok(Item::Phrase(value)),
            _ => Err(unexpected(&token)),
        }
    }

    /// Consumes a token that must satisfy `accept`.
    fn expect(&mut self, accept: impl Fn(&TokenKind) -> bool) -> Result<Token, ParseError> {
        let token = self.next_token()?;
        if accept(&token.kind) {
            Ok(token)
        } else {
            Err(unexpected(&token))
        }
    }

    /// Consumes and returns the current token.
    fn next_token(&mut self) -> Result<Token, ParseError> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(ParseError::end_of_input)?;
        self.advance();
        Ok(token)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Returns the kind of the current token.
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind.clone())
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Error for a token the grammar does not accept here.
fn unexpected(token: &Token) -> ParseError {
    ParseError::new(format!("unexpected '{}'", token.raw), Some(token.position))
}

/// Joins two juxtaposed expressions, splicing the operands of a right-hand group.
fn juxtapose(left: Item, right: Item) -> Item {
    match right {
        Item::Group(mut operands) => {
            operands.insert(0, left);
            Item::Group(operands)
        }
        other => Item::Group(vec![left, other]),
    }
}

/// Parses a query string into an AST.
///
/// Returns `Ok(None)` for empty queries, `Ok(Some(item))` for valid queries,
/// or `Err(QueryError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<Item>, QueryError> {
    Parser::new(tokenize(input))
        .parse()
        .map_err(|err| QueryError::from(err).with_query(input))
}
