//! Tokenizer driven by the signs of an operator table.
//!
//! The source is first split on whitespace, then every residue fragment is cut
//! by each sign of the table in turn. Numeric literals such as `1e+5`, which the
//! sign cuts break into `1e`, `+`, `5`, are merged back by a one-pass
//! three-piece lookahead. What remains is classified as a number or an
//! identifier.
//!
//! Signs are applied independently, in table order. A sign that is part of a
//! longer sign (`<` in `<=`) cuts the longer one if it comes first in the
//! table; the table warns about such pairs when it is built.
//!
//! # Example
//! ```rust
//! # use opgram::{Lexer, TokenValue};
//! use smartstring::alias::String;
//! let signs = vec![String::from("+"), String::from("*")];
//! let lexer = Lexer::new(&signs);
//! let tokens = lexer.tokenize("x+1e+5*2").unwrap();
//! let values: Vec<_> = tokens.into_iter().map(|t| t.value).collect();
//! assert_eq!(
//!     values,
//!     [
//!         TokenValue::Ident("x".into()),
//!         TokenValue::Sign("+".into()),
//!         TokenValue::Number(1e5),
//!         TokenValue::Sign("*".into()),
//!         TokenValue::Number(2.0),
//!     ]
//! );
//! ```

use crate::error::{Position, Span, SyntaxError, SyntaxErrorKind};
use crate::oper::{OperId, OperTable};
use once_cell::sync::Lazy;
use regex::Regex;
use smartstring::alias::String;

/// A complete real-number literal. Neither the integer part nor the exponent
/// may have a leading zero, so `012` and `1e05` are malformed.
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([1-9][0-9]*|0)(\.[0-9]*)?|\.[0-9]+)([eE][+-]?(0|[1-9][0-9]*))?$")
        .expect("number pattern")
});

/// A mantissa followed by an exponent marker, e.g. `1.5e`.
static MANTISSA_EXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(([1-9][0-9]*|0)(\.[0-9]*)?|\.[0-9]+)[eE]$").expect("mantissa pattern"));

/// An unsigned exponent, e.g. `5`.
static EXPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|[1-9][0-9]*)$").expect("exponent pattern"));

/// The payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// One of the table's signs.
    Sign(String),
    /// A real-number literal.
    Number(f64),
    /// Any other fragment.
    Ident(String),
}

/// A token and the source range it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    pub fn new(value: TokenValue, span: Span) -> Self {
        Self { value, span }
    }

    pub fn is_sign(&self) -> bool {
        matches!(self.value, TokenValue::Sign(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self.value, TokenValue::Number(_))
    }

    pub fn is_ident(&self) -> bool {
        matches!(self.value, TokenValue::Ident(_))
    }

    /// The sign of a sign token.
    pub fn sign(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Sign(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The value of a number token.
    pub fn number(&self) -> Option<f64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The name of an identifier token.
    pub fn ident(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Ident(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Intermediate piece: a sign already cut out, or text still to be cut.
#[derive(Debug, Clone)]
enum Piece {
    Sign(String, Span),
    Residue(String, Span),
}

impl Piece {
    fn residue(&self) -> Option<&str> {
        match self {
            Piece::Residue(text, _) => Some(text.as_str()),
            Piece::Sign(..) => None,
        }
    }

    fn span(&self) -> Span {
        match self {
            Piece::Sign(_, span) | Piece::Residue(_, span) => *span,
        }
    }
}

/// Splits source text into tokens using a fixed list of signs.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    signs: &'a [String],
}

impl<'a> Lexer<'a> {
    /// Creates a lexer cutting on `signs`, applied in the given order.
    pub fn new(signs: &'a [String]) -> Self {
        Self { signs }
    }

    /// Creates a lexer for the signs of `table`.
    pub fn for_table<I: OperId>(table: &'a OperTable<I>) -> Self {
        Self::new(table.signs())
    }

    /// Tokenizes `source`.
    ///
    /// # Errors
    /// [`SyntaxErrorKind::MalformedNumber`] for a digit-leading fragment that
    /// is not a finite real number. Tokenizing stops at the first error.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, SyntaxError> {
        let mut pieces = split_whitespace(source);
        for sign in self.signs {
            pieces = pieces
                .into_iter()
                .flat_map(|piece| cut(piece, sign))
                .collect();
        }

        let mut tokens = Vec::with_capacity(pieces.len());
        let mut i = 0;
        while i < pieces.len() {
            if let Some(token) = merge_exponent(&pieces[i..]) {
                tokens.push(token);
                i += 3;
                continue;
            }
            let token = match &pieces[i] {
                Piece::Sign(sign, span) => Token::new(TokenValue::Sign(sign.clone()), *span),
                Piece::Residue(text, span) => classify(text, *span, tokens.len())?,
            };
            tokens.push(token);
            i += 1;
        }
        log::trace!("tokenized {} pieces into {} tokens", pieces.len(), tokens.len());
        Ok(tokens)
    }
}

/// Tokenizes `source` with the signs of `table`.
pub fn tokenize<I: OperId>(table: &OperTable<I>, source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::for_table(table).tokenize(source)
}

fn split_whitespace(source: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut pos = Position::default();
    let mut text = String::new();
    let mut start = pos;
    for ch in source.chars() {
        if ch.is_whitespace() {
            if !text.is_empty() {
                pieces.push(Piece::Residue(std::mem::take(&mut text), Span::new(start, pos)));
            }
            if ch == '\n' {
                pos = Position::new(pos.line + 1, 0);
            } else {
                pos = pos.shifted(1);
            }
            start = pos;
        } else {
            text.push(ch);
            pos = pos.shifted(1);
        }
    }
    if !text.is_empty() {
        pieces.push(Piece::Residue(text, Span::new(start, pos)));
    }
    pieces
}

/// Cuts a residue on every occurrence of `sign`. Empty residues vanish.
fn cut(piece: Piece, sign: &str) -> Vec<Piece> {
    let (text, span) = match piece {
        Piece::Residue(text, span) => (text, span),
        sign => return vec![sign],
    };
    let sign_len = sign.chars().count();
    let mut out = Vec::new();
    let mut column = 0;
    for (i, part) in text.split(sign).enumerate() {
        if i > 0 {
            let start = span.start.shifted(column);
            out.push(Piece::Sign(
                String::from(sign),
                Span::new(start, start.shifted(sign_len)),
            ));
            column += sign_len;
        }
        let part_len = part.chars().count();
        if part_len > 0 {
            let start = span.start.shifted(column);
            out.push(Piece::Residue(
                String::from(part),
                Span::new(start, start.shifted(part_len)),
            ));
        }
        column += part_len;
    }
    out
}

/// Merges `<mantissa>e`, `+`|`-`, `<exponent>` into one number token.
fn merge_exponent(pieces: &[Piece]) -> Option<Token> {
    let [mantissa, sign, exponent, ..] = pieces else {
        return None;
    };
    let m = mantissa.residue().filter(|m| MANTISSA_EXP.is_match(m))?;
    let e = exponent.residue().filter(|e| EXPONENT.is_match(e))?;
    let Piece::Sign(s, _) = sign else {
        return None;
    };
    if s != "+" && s != "-" {
        return None;
    }
    let text = format!("{m}{s}{e}");
    let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(Token::new(
        TokenValue::Number(value),
        mantissa.span().merge(&exponent.span()),
    ))
}

fn classify(text: &str, span: Span, at: usize) -> Result<Token, SyntaxError> {
    if NUMBER.is_match(text) {
        if let Some(value) = text.parse::<f64>().ok().filter(|v| v.is_finite()) {
            return Ok(Token::new(TokenValue::Number(value), span));
        }
    }
    if text.starts_with(|ch: char| ch.is_ascii_digit()) || NUMBER.is_match(text) {
        return Err(SyntaxError::new(
            SyntaxErrorKind::MalformedNumber(String::from(text)),
            at,
            Some(span),
        ));
    }
    Ok(Token::new(TokenValue::Ident(String::from(text)), span))
}
