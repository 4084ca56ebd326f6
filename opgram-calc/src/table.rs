//! # Reference table
//!
//! The operator table of the calculator language, built once on first use.
//! The same table ships in text form as `defs/reference.defs`; any other
//! definition file over [`CalcOper`] ids can be loaded with [`load_table`].
//!
//! Several signs of this table contain shorter ones (`<` in `<=`, `$` in
//! `$=`). Signs cut the input in table order, so `<=` and `$=` are split by
//! the shorter sign before they are ever seen. Building the table logs a
//! warning for each such pair.

use crate::{CalcError, CalcOper};
use once_cell::sync::Lazy;
use opgram::{OperDef, OperTable, PriorityLevel, Slot, parse_defs};
use std::path::Path;

/// The reference grammar in definition-file form.
pub const REFERENCE_DEFS: &str = include_str!("../defs/reference.defs");

static REFERENCE: Lazy<OperTable<CalcOper>> = Lazy::new(|| {
    OperTable::try_new(reference_levels()).expect("reference table is valid")
});

/// The validated reference table.
pub fn reference() -> &'static OperTable<CalcOper> {
    &REFERENCE
}

/// Priority levels of the reference grammar, tightest first.
pub fn reference_levels() -> Vec<PriorityLevel<CalcOper>> {
    use CalcOper::*;
    use Slot as S;

    let binary = |id, sign| OperDef::chain(id, [S::sign(sign), S::hole()]);
    let delimited = |open, close| [S::sign(open), S::hole(), S::sign(close)];

    vec![
        PriorityLevel::right(
            "atom",
            [
                OperDef::value(Group, delimited("(", ")")),
                OperDef::value(List, delimited("[", "]")),
                OperDef::value(Block, delimited("{", "}")),
                OperDef::chain(Global, [S::sign("#")]),
                OperDef::chain(Local, [S::sign("$")]),
            ],
        ),
        PriorityLevel::left(
            "postfix",
            [
                binary(Member, "."),
                OperDef::chain(Call, delimited("(", ")")),
                OperDef::chain(Index, delimited("[", "]")),
                OperDef::chain(BlockCall, delimited("{", "}")),
                binary(Special, "#"),
            ],
        ),
        PriorityLevel::right(
            "prefix",
            [
                OperDef::chain(Pos, [S::sign("+")]),
                OperDef::chain(Neg, [S::sign("-")]),
            ],
        ),
        PriorityLevel::left("term", [binary(Mul, "*"), binary(Div, "/")]),
        PriorityLevel::left("sum", [binary(Add, "+"), binary(Sub, "-")]),
        PriorityLevel::left(
            "cmp",
            [
                binary(Eq, "=="),
                binary(Ne, "!="),
                binary(Lt, "<"),
                binary(Gt, ">"),
                binary(Le, "<="),
                binary(Ge, ">="),
            ],
        ),
        PriorityLevel::right(
            "assign",
            [
                OperDef::chain(Assign, [S::hole(), S::sign("=")]),
                OperDef::chain(Update, [S::hole(), S::sign("$=")]),
            ],
        ),
        PriorityLevel::left(
            "sep",
            [
                binary(Tuple, ","),
                OperDef::chain(TupleEnd, [S::sign(",")]),
            ],
        ),
        PriorityLevel::left(
            "stmt",
            [binary(Seq, ";"), OperDef::chain(SeqEnd, [S::sign(";")])],
        ),
    ]
}

/// Builds a table from definition text.
pub fn table_from_defs(text: &str) -> Result<OperTable<CalcOper>, CalcError> {
    let levels = parse_defs::<CalcOper>(text)?;
    Ok(OperTable::try_new(levels)?)
}

/// Reads and builds a table from a definition file.
pub fn load_table(path: impl AsRef<Path>) -> Result<OperTable<CalcOper>, CalcError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    log::info!("loading operator table from {}", path.display());
    table_from_defs(&text)
}
