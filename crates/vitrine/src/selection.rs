//! Scenario selection.
//!
//! A [`Selection`] combines a marker expression such as
//! `smoke and not negative` or `(cart or checkout) and regression` with a
//! case-insensitive substring filter on scenario names. Expressions are
//! parsed by a small recursive-descent parser:
//!
//! ```text
//! expr    := term ("or" term)*
//! term    := factor ("and" factor)*
//! factor  := "not" factor | "(" expr ")" | MARKER
//! ```

use crate::result::{VitrineError, VitrineResult};
use std::fmt;

/// Token of a marker expression
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Marker(String),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(name) => f.write_str(name),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Not => f.write_str("not"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
        }
    }
}

fn invalid(reason: impl Into<String>) -> VitrineError {
    VitrineError::config("markers", reason)
}

fn tokenize(input: &str) -> VitrineResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                let _ = chars.next();
            }
            '(' => {
                let _ = chars.next();
                tokens.push(Token::LeftParen);
            }
            ')' => {
                let _ = chars.next();
                tokens.push(Token::RightParen);
            }
            c if c.is_ascii_alphanumeric() || c == '_' || c == '-' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                        end = i + c.len_utf8();
                        let _ = chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match &input[start..end] {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    word => Token::Marker(word.to_string()),
                });
            }
            other => return Err(invalid(format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

/// Parsed marker expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerExpr {
    Marker(String),
    Not(Box<MarkerExpr>),
    And(Box<MarkerExpr>, Box<MarkerExpr>),
    Or(Box<MarkerExpr>, Box<MarkerExpr>),
}

impl MarkerExpr {
    /// Parse an expression
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for option `markers` on any syntax
    /// error.
    pub fn parse(input: &str) -> VitrineResult<Self> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(invalid("empty marker expression"));
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(invalid(format!("unexpected '{token}' in '{input}'"))),
        }
    }

    /// Evaluate against a scenario's markers
    #[must_use]
    pub fn matches(&self, markers: &[&str]) -> bool {
        match self {
            Self::Marker(name) => markers.contains(&name.as_str()),
            Self::Not(inner) => !inner.matches(markers),
            Self::And(left, right) => left.matches(markers) && right.matches(markers),
            Self::Or(left, right) => left.matches(markers) || right.matches(markers),
        }
    }

    /// Markers named anywhere in the expression
    #[must_use]
    pub fn referenced(&self) -> Vec<&str> {
        match self {
            Self::Marker(name) => vec![name.as_str()],
            Self::Not(inner) => inner.referenced(),
            Self::And(left, right) | Self::Or(left, right) => {
                let mut names = left.referenced();
                names.extend(right.referenced());
                names
            }
        }
    }
}

impl fmt::Display for MarkerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(name) => f.write_str(name),
            Self::Not(inner) => write!(f, "not {inner}"),
            Self::And(left, right) => write!(f, "({left} and {right})"),
            Self::Or(left, right) => write!(f, "({left} or {right})"),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> VitrineResult<MarkerExpr> {
        let mut left = self.term()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.term()?;
            left = MarkerExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> VitrineResult<MarkerExpr> {
        let mut left = self.factor()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            let right = self.factor()?;
            left = MarkerExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn factor(&mut self) -> VitrineResult<MarkerExpr> {
        match self.next() {
            Some(Token::Not) => Ok(MarkerExpr::Not(Box::new(self.factor()?))),
            Some(Token::LeftParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RightParen) => Ok(inner),
                    _ => Err(invalid("missing ')'")),
                }
            }
            Some(Token::Marker(name)) => Ok(MarkerExpr::Marker(name)),
            Some(token) => Err(invalid(format!("expected a marker, found '{token}'"))),
            None => Err(invalid("expression ends early")),
        }
    }
}

/// Which scenarios to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    markers: Option<MarkerExpr>,
    filter: Option<String>,
}

impl Selection {
    /// Select everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to scenarios whose markers satisfy `expr`
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `expr` does not parse.
    pub fn with_markers(mut self, expr: &str) -> VitrineResult<Self> {
        self.markers = Some(MarkerExpr::parse(expr)?);
        Ok(self)
    }

    /// Restrict to scenarios whose name contains `text` (any case)
    #[must_use]
    pub fn with_filter(mut self, text: &str) -> Self {
        let text = text.trim();
        self.filter = (!text.is_empty()).then(|| text.to_lowercase());
        self
    }

    #[must_use]
    pub const fn marker_expr(&self) -> Option<&MarkerExpr> {
        self.markers.as_ref()
    }

    #[must_use]
    pub fn matches(&self, name: &str, markers: &[&str]) -> bool {
        let by_marker = self.markers.as_ref().map_or(true, |expr| expr.matches(markers));
        let by_name = self
            .filter
            .as_ref()
            .map_or(true, |text| name.to_lowercase().contains(text));
        by_marker && by_name
    }
}
