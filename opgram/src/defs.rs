//! Text format for operator tables.
//!
//! A definition file is a sequence of lines. Blank lines and lines starting
//! with `//` are ignored. A `level` line opens a priority level; every
//! operator line after it belongs to that level, so levels are listed from
//! tightest to loosest:
//!
//! ```text
//! // name  assoc
//! level term left
//! chain mul * _
//! chain div / _
//! level sum left
//! chain add + _:term
//! ```
//!
//! An operator line is `chain` or `value`, then the operator id, then the
//! slot pattern. `_` is a hole, `_:<level>` a hole limited to `<level>`, any
//! other word a literal sign.
//!
//! The loader only checks the format. The result still has to be validated by
//! [`OperTable::try_new`](crate::OperTable::try_new).

use crate::oper::{Assoc, OperDef, OperKind, PriorityLevel, Slot};
use smartstring::alias::String;
use std::str::FromStr;
use thiserror::Error;

/// What is wrong with a definition line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefsErrorKind {
    #[error("unknown directive {0:?}")]
    UnknownDirective(String),

    #[error("`level` needs a name and an associativity")]
    MalformedLevel,

    #[error("invalid associativity {0:?}")]
    InvalidAssoc(String),

    #[error("operator defined before any level")]
    NoLevel,

    #[error("operator needs an id")]
    MissingId,

    #[error("unknown operator id {0:?}")]
    UnknownId(String),

    #[error("operator {0:?} has an empty pattern")]
    EmptyPattern(String),

    #[error("hole limit is missing a level name")]
    EmptyLimit,
}

/// A definition error and the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct DefsError {
    pub line: usize,
    pub kind: DefsErrorKind,
}

/// Parses operator table definitions.
///
/// Operator ids are parsed with `I::from_str`.
///
/// # Errors
/// The first malformed line, see [`DefsErrorKind`].
pub fn parse_defs<I: FromStr>(text: &str) -> Result<Vec<PriorityLevel<I>>, DefsError> {
    let mut levels: Vec<PriorityLevel<I>> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let fail = |kind| DefsError {
            line: index + 1,
            kind,
        };
        let mut words = line.split_whitespace();
        let Some(directive) = words.next() else {
            continue;
        };
        if directive.starts_with("//") {
            continue;
        }
        match directive {
            "level" => {
                let (Some(name), Some(assoc), None) = (words.next(), words.next(), words.next())
                else {
                    return Err(fail(DefsErrorKind::MalformedLevel));
                };
                let assoc = Assoc::from_str(assoc)
                    .map_err(|_| fail(DefsErrorKind::InvalidAssoc(assoc.into())))?;
                levels.push(PriorityLevel::new(name, assoc, Vec::new()));
            }
            "chain" | "value" => {
                let kind = OperKind::from_str(directive)
                    .map_err(|_| fail(DefsErrorKind::UnknownDirective(directive.into())))?;
                let Some(level) = levels.last_mut() else {
                    return Err(fail(DefsErrorKind::NoLevel));
                };
                let Some(name) = words.next() else {
                    return Err(fail(DefsErrorKind::MissingId));
                };
                let id = I::from_str(name).map_err(|_| fail(DefsErrorKind::UnknownId(name.into())))?;
                let pattern = words.map(slot).collect::<Option<Vec<_>>>();
                let pattern = pattern.ok_or_else(|| fail(DefsErrorKind::EmptyLimit))?;
                if pattern.is_empty() {
                    return Err(fail(DefsErrorKind::EmptyPattern(name.into())));
                }
                level.opers.push(OperDef { id, kind, pattern });
            }
            other => return Err(fail(DefsErrorKind::UnknownDirective(other.into()))),
        }
    }
    log::debug!("loaded {} levels", levels.len());
    Ok(levels)
}

/// `None` for a limit marker without a level name.
fn slot(word: &str) -> Option<Slot> {
    match word {
        "_" => Some(Slot::hole()),
        _ => match word.strip_prefix("_:") {
            Some("") => None,
            Some(level) => Some(Slot::hole_until(level)),
            None => Some(Slot::sign(word)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oper::{OperId, OperTable};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Group,
        Mul,
        Add,
    }

    impl From<Op> for usize {
        fn from(op: Op) -> Self {
            op as usize
        }
    }

    impl OperId for Op {
        const COUNT: usize = 3;
    }

    impl FromStr for Op {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "group" => Ok(Op::Group),
                "mul" => Ok(Op::Mul),
                "add" => Ok(Op::Add),
                _ => Err(()),
            }
        }
    }

    const DEFS: &str = "
        // tightest first
        level atom right
        value group ( _ )

        level term left
        chain mul * _
        level sum left
        chain add + _:term
    ";

    #[test]
    fn loads_levels_in_order() {
        let levels = parse_defs::<Op>(DEFS).unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].name, "atom");
        assert_eq!(levels[0].assoc, Assoc::Right);
        assert_eq!(levels[0].opers[0].kind, OperKind::Value);
        assert_eq!(
            levels[0].opers[0].pattern,
            [Slot::sign("("), Slot::hole(), Slot::sign(")")]
        );
        assert_eq!(
            levels[2].opers[0].pattern,
            [Slot::sign("+"), Slot::hole_until("term")]
        );
    }

    #[test]
    fn loaded_table_validates() {
        let table = OperTable::try_new(parse_defs::<Op>(DEFS).unwrap()).unwrap();
        assert_eq!(table.get(Op::Add).unwrap().bound, Some(2));
        assert_eq!(table.signs(), ["(", ")", "*", "+"]);
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_defs::<Op>("level a left\n\nchain pow ^ _").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.kind, DefsErrorKind::UnknownId("pow".into()));
        assert_eq!(err.to_string(), "line 3: unknown operator id \"pow\"");
    }

    #[test]
    fn rejects_malformed_lines() {
        let cases = [
            ("chain add + _", DefsErrorKind::NoLevel),
            ("level a", DefsErrorKind::MalformedLevel),
            ("level a up", DefsErrorKind::InvalidAssoc("up".into())),
            ("level a left\nchain", DefsErrorKind::MissingId),
            ("level a left\nchain add", DefsErrorKind::EmptyPattern("add".into())),
            ("level a left\nchain add + _:", DefsErrorKind::EmptyLimit),
            ("prefix add +", DefsErrorKind::UnknownDirective("prefix".into())),
        ];
        for (text, kind) in cases {
            assert_eq!(parse_defs::<Op>(text).unwrap_err().kind, kind, "{text:?}");
        }
    }
}
