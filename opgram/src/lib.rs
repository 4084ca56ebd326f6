//! # opgram
//!
//! A grammar engine driven by a declarative operator table.
//!
//! A table lists priority levels, tightest first. Each level has one
//! associativity and holds operators described by slot patterns of literal
//! signs and expression holes. From the table alone the crate derives a
//! tokenizer and a precedence-climbing parser that backtracks where signs are
//! shared between operators, and produces an [`Ast`].
//!
//! ## Overview
//!
//! - [`oper`]: operator definitions and the validated [`OperTable`].
//! - [`defs`]: a text format for tables, loaded with [`parse_defs`].
//! - [`lexer`]: splits source text into sign, number and identifier tokens.
//! - [`group`]: operators keyed by leading sign, per parsing context.
//! - [`stack`]: persistent stacks that make forking a parse cheap.
//! - [`parser`]: the backtracking [`Parser`].
//! - [`ast`]: the tree and its printer.
//! - [`error`]: spans and the error taxonomy.
//!
//! ## Example
//!
//! ```rust
//! use opgram::{OperDef, OperId, OperTable, PriorityLevel, Slot, parse_str};
//! use std::fmt;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Op { Group, Neg, Mul, Add }
//! impl From<Op> for usize { fn from(op: Op) -> usize { op as usize } }
//! impl OperId for Op { const COUNT: usize = 4; }
//! impl fmt::Display for Op {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{}", format!("{:?}", self).to_lowercase())
//!     }
//! }
//!
//! let table = OperTable::try_new(vec![
//!     PriorityLevel::right("atom", [OperDef::value(Op::Group, [Slot::sign("("), Slot::hole(), Slot::sign(")")])]),
//!     PriorityLevel::right("pref", [OperDef::chain(Op::Neg, [Slot::sign("-")])]),
//!     PriorityLevel::left("term", [OperDef::chain(Op::Mul, [Slot::sign("*"), Slot::hole()])]),
//!     PriorityLevel::left("sum", [OperDef::chain(Op::Add, [Slot::sign("+"), Slot::hole()])]),
//! ])
//! .unwrap();
//!
//! let ast = parse_str(&table, "-(2 + 3) * 4").unwrap();
//! assert_eq!(ast.to_string(), "mul(neg(group(add(2, 3))), 4)");
//! assert_eq!(ast.render(&table).unwrap(), "- ( 2 + 3 ) * 4");
//! ```
pub mod ast;
pub mod defs;
pub mod error;
pub mod group;
pub mod lexer;
pub mod oper;
pub mod parser;
pub mod stack;

pub use crate::ast::{Ast, Literal};
pub use crate::defs::{DefsError, DefsErrorKind, parse_defs};
pub use crate::error::{
    GrammarError, InternalError, Position, Span, SyntaxError, SyntaxErrorKind,
};
pub use crate::group::GroupIndex;
pub use crate::lexer::{Lexer, Token, TokenValue, tokenize};
pub use crate::oper::{
    Assoc, OperDef, OperEntry, OperId, OperKind, OperTable, ParseAssocError, ParseOperKindError,
    PriorityLevel, Slot,
};
pub use crate::parser::{Parser, ParserStats};

/// Tokenizes and parses `source` in one call.
///
/// Builds a fresh [`Parser`]; reuse one to parse many inputs over the same
/// table.
pub fn parse_str<I: OperId>(table: &OperTable<I>, source: &str) -> Result<Ast<I>, GrammarError> {
    let tokens = tokenize(table, source)?;
    Parser::new(table).parse(&tokens)
}
