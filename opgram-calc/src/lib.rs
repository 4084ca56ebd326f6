//! # opgram-calc
//!
//! The reference grammar for **opgram**: a small expression language with
//! grouping, calls, indexing, unary and binary arithmetic, comparisons,
//! assignment, tuples and statement sequences.
//!
//! ## Overview
//!
//! - [`oper`]: [`CalcOper`], the operator ids of the language.
//! - [`table`]: the reference [`OperTable`](opgram::OperTable) and loaders
//!   for definition files.
//! - [`parser`]: [`CalcParser`], text in, [`Ast`] out.
//! - [`error`]: [`CalcError`], which wraps every failure of the above.
//!
//! ## Example
//!
//! ```rust
//! let ast = opgram_calc::parse_str("f ( x , 2 ) [ 0 ] ;").unwrap();
//! assert_eq!(ast.to_string(), "seq_end(index(call(f, tuple(x, 2)), 0))");
//! ```
pub mod error;
pub mod oper;
pub mod parser;
pub mod table;

pub use error::CalcError;
pub use oper::{CalcOper, ParseCalcOperError};
pub use parser::CalcParser;
pub use table::{REFERENCE_DEFS, load_table, reference, reference_levels, table_from_defs};

use opgram::Ast;

/// Parses `source` with the reference table.
pub fn parse_str(source: &str) -> Result<Ast<CalcOper>, CalcError> {
    CalcParser::default().parse(source)
}
