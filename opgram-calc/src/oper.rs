//! # Calculator operators
//!
//! [`CalcOper`] is the closed set of operator ids of the reference grammar.
//! Each variant has a canonical lowercase name, used by [`Display`], by
//! [`FromStr`] and therefore by table definition files.
//!
//! [`Display`]: std::fmt::Display

use opgram::OperId;
use smartstring::alias::String;
use std::fmt;
use std::str::FromStr;

/// Operator ids of the reference grammar, grouped by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CalcOper {
    // atom
    Group,
    List,
    Block,
    Global,
    Local,
    // postfix
    Member,
    Call,
    Index,
    BlockCall,
    Special,
    // prefix
    Pos,
    Neg,
    // term
    Mul,
    Div,
    // sum
    Add,
    Sub,
    // comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // assignment
    Assign,
    Update,
    // separators
    Tuple,
    TupleEnd,
    Seq,
    SeqEnd,
}

impl CalcOper {
    /// Every id, in declaration order.
    pub const ALL: [CalcOper; 28] = [
        CalcOper::Group,
        CalcOper::List,
        CalcOper::Block,
        CalcOper::Global,
        CalcOper::Local,
        CalcOper::Member,
        CalcOper::Call,
        CalcOper::Index,
        CalcOper::BlockCall,
        CalcOper::Special,
        CalcOper::Pos,
        CalcOper::Neg,
        CalcOper::Mul,
        CalcOper::Div,
        CalcOper::Add,
        CalcOper::Sub,
        CalcOper::Eq,
        CalcOper::Ne,
        CalcOper::Lt,
        CalcOper::Gt,
        CalcOper::Le,
        CalcOper::Ge,
        CalcOper::Assign,
        CalcOper::Update,
        CalcOper::Tuple,
        CalcOper::TupleEnd,
        CalcOper::Seq,
        CalcOper::SeqEnd,
    ];

    /// Canonical names, indexed like [`CalcOper::ALL`].
    pub const STRS: &[&str] = &[
        "group",
        "list",
        "block",
        "global",
        "local",
        "member",
        "call",
        "index",
        "block_call",
        "special",
        "pos",
        "neg",
        "mul",
        "div",
        "add",
        "sub",
        "eq",
        "ne",
        "lt",
        "gt",
        "le",
        "ge",
        "assign",
        "update",
        "tuple",
        "tuple_end",
        "seq",
        "seq_end",
    ];

    pub fn as_str(self) -> &'static str {
        CalcOper::STRS[usize::from(self)]
    }
}

impl From<CalcOper> for usize {
    fn from(op: CalcOper) -> Self {
        op as usize
    }
}

impl OperId for CalcOper {
    const COUNT: usize = 28;
}

impl fmt::Display for CalcOper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type returned when parsing a [`CalcOper`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCalcOperError(String);

impl fmt::Display for ParseCalcOperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid operator: {}", self.0)
    }
}

impl std::error::Error for ParseCalcOperError {}

impl FromStr for CalcOper {
    type Err = ParseCalcOperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalcOper::STRS
            .iter()
            .position(|name| *name == s)
            .map(|i| CalcOper::ALL[i])
            .ok_or_else(|| ParseCalcOperError(String::from(s)))
    }
}
