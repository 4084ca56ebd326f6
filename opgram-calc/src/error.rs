//! # Calculator Error Type
//!
//! This module defines [`CalcError`], a unified error enum for the calculator
//! front end. It aggregates failures from:
//!
//! - **Parsing** an expression (tokenizer and parser),
//! - **Building** an operator table,
//! - **Loading** table definitions from text or from a file.
//!
//! Conversions from underlying error types are derived with `#[from]`, enabling
//! propagation via the `?` operator in functions that return
//! `Result<T, CalcError>`.
use opgram::{DefsError, GrammarError, InternalError};
use thiserror::Error;

/// Represents all possible errors of the calculator front end.
///
/// # Examples
/// ```rust
/// # use opgram_calc::CalcError;
/// let err: CalcError = opgram::InternalError::StackUnderflow.into();
/// assert!(matches!(err, CalcError::Internal(_)));
/// ```
#[derive(Debug, Error)]
pub enum CalcError {
    /// An expression could not be tokenized or parsed.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// An operator table failed validation.
    #[error("invalid operator table: {0}")]
    Internal(#[from] InternalError),

    /// Table definitions are malformed.
    #[error("invalid table definitions: {0}")]
    Defs(#[from] DefsError),

    /// A file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use opgram::{SyntaxError, SyntaxErrorKind};

    fn _assert_error_trait_obj(e: &dyn std::error::Error) -> &dyn std::error::Error {
        e
    }

    #[test]
    fn grammar_error_is_transparent() {
        let syntax = SyntaxError::new(SyntaxErrorKind::ExpressionExpected, 3, None);
        let err: CalcError = GrammarError::from(syntax.clone()).into();
        assert!(matches!(err, CalcError::Grammar(_)));
        let _ = _assert_error_trait_obj(&err);
        assert_eq!(err.to_string(), syntax.to_string());
    }

    #[test]
    fn io_error_maps_to_calc_error() {
        let err: CalcError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CalcError::Io(_)));
        assert!(err.to_string().contains("io error"));
    }

    // If CalcError ever stops being Send + Sync + 'static these will fail to compile.
    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn calc_error_is_send_sync_static() {
        _assert_send_sync_static::<CalcError>();
    }
}
