//! Source locations and the error taxonomy of the grammar engine.
//!
//! Two families of errors exist:
//!
//! - [`SyntaxError`]: the input is malformed. Always user-facing and always
//!   tagged with the index of the token where the problem was detected.
//! - [`InternalError`]: the operator table or the parser itself violated an
//!   invariant. Never caused by user input when the table is valid.
//!
//! [`GrammarError`] is the single error surface returned by tokenizing and
//! parsing. Conversions are derived with `#[from]`, so `?` works at call sites
//! returning `Result<T, GrammarError>`.
//!
//! # Examples
//!
//! ```rust
//! # use opgram::{Position, Span, span};
//! let sp = Span::new(Position::new(0, 2), Position::new(0, 5));
//! assert!(!sp.is_empty());
//! assert_eq!(sp.line_range(), (0, 0));
//! assert_eq!(span!(0, 2, 0, 5), Some(sp));
//! ```

use smartstring::alias::String;
use thiserror::Error;

/// A 0-based line/column position in source text.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 0-based line number.
    pub line: usize,
    /// 0-based column number (character position in the line).
    pub column: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns the position `n` characters further on the same line.
    #[inline]
    pub const fn shifted(self, n: usize) -> Self {
        Self {
            line: self.line,
            column: self.column + n,
        }
    }
}

/// A half-open source range: `[start, end)`.
///
/// Every token carries the span of the text it was cut from. Tokens merged by
/// the numeric fixup carry the merge of their parts.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Creates a new `Span`.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Merge with another span by covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let start = if self.start <= other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end >= other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// Is this span empty (start == end)?
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the inclusive line range spanned by this `Span`.
    #[inline]
    pub fn line_range(&self) -> (usize, usize) {
        (self.start.line, self.end.line)
    }

    /// Pretty-print for diagnostics (human-readable).
    #[inline]
    pub fn display(&self) -> std::string::String {
        format!(
            "span {}:{} to {}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// What went wrong in a malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// A digit-leading fragment is not a valid real number.
    #[error("malformed number literal {0:?}")]
    MalformedNumber(String),

    /// A sign that cannot start an expression appeared where one was expected.
    /// The sign could continue an expression, so an operand is missing.
    #[error("an expression is required before {0:?}")]
    NeedsOperandBefore(String),

    /// A sign appeared where no operator of the table admits it.
    #[error("unexpected {0:?}")]
    UnexpectedSign(String),

    /// A specific sign of a pending operator was required.
    #[error("expected {0:?}")]
    ExpectedSign(String),

    /// Input ended where an expression had to start.
    #[error("an expression is expected")]
    ExpressionExpected,

    /// Two expressions follow each other with no operator between them.
    #[error("two expressions cannot simply follow each other")]
    AdjacentExpressions,
}

impl SyntaxErrorKind {
    /// Tie-break rank among failures at the same token; lower is preferred
    /// for reporting.
    pub fn severity(&self) -> u8 {
        match self {
            SyntaxErrorKind::UnexpectedSign(_) => 1,
            _ => 0,
        }
    }
}

/// A user-facing error in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at token {at}: {kind}")]
pub struct SyntaxError {
    /// What went wrong.
    pub kind: SyntaxErrorKind,
    /// Index of the offending token; equals the token count at end of input.
    pub at: usize,
    /// Source location of the offending token, if there is one.
    pub span: Option<Span>,
}

impl SyntaxError {
    /// Creates a new `SyntaxError`.
    pub fn new(kind: SyntaxErrorKind, at: usize, span: Option<Span>) -> Self {
        Self { kind, at, span }
    }
}

/// An invariant violation in the operator table or the parser.
///
/// Table-shape errors are raised once, by [`OperTable::try_new`]; the rest
/// indicate a defect and abort a parse without backtracking.
///
/// [`OperTable::try_new`]: crate::OperTable::try_new
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// Operators are identified by their first sign, so one is required.
    #[error("operator {0} contains no sign")]
    NoSign(String),

    /// The same operator id is defined twice.
    #[error("operator {0} is defined more than once")]
    DuplicateOperator(String),

    /// The slot pattern cannot be parsed with the operator's kind and level.
    #[error("operator {id} has an invalid pattern: {reason}")]
    InvalidPattern {
        /// Operator id.
        id: String,
        /// Which structural rule is broken.
        reason: &'static str,
    },

    /// A hole limit names a level that does not exist.
    #[error("operator {id} refers to unknown level {level:?}")]
    UnknownLevel {
        /// Operator id.
        id: String,
        /// The missing level name.
        level: String,
    },

    /// An operator id has no definition in the table.
    #[error("operator {0} is not defined")]
    UnknownOperator(String),

    /// A reduction needed more expressions than the stack held.
    #[error("expression stack underflow")]
    StackUnderflow,

    /// An operator node holds a different number of arguments than its
    /// definition implies.
    #[error("operator {id} takes {expected} arguments, found {found}")]
    ArityMismatch {
        /// Operator id.
        id: String,
        /// Arity derived from the table.
        expected: usize,
        /// Arguments present in the node.
        found: usize,
    },

    /// Draining did not leave exactly one expression.
    #[error("{0} expressions remain after draining")]
    DanglingExpressions(usize),
}

/// The error surface of tokenizing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The input is malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The table or the parser violated an invariant.
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl GrammarError {
    /// Returns the syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            GrammarError::Syntax(e) => Some(e),
            GrammarError::Internal(_) => None,
        }
    }
}

/// Build an `Option<Span>` inline from 0-based line/column coordinates.
///
/// # Examples
///
/// ```rust
/// # use opgram::span;
/// let s = span!(0, 0, 1, 4);
/// assert_eq!(s.unwrap().end.column, 4);
/// ```
#[macro_export]
macro_rules! span {
    ($line_start:expr, $col_start:expr, $line_end:expr, $col_end:expr) => {
        Some($crate::Span {
            start: $crate::Position {
                line: $line_start,
                column: $col_start,
            },
            end: $crate::Position {
                line: $line_end,
                column: $col_end,
            },
        })
    };
}
