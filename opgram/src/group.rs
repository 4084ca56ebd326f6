//! Operators grouped by the sign they are recognized by.
//!
//! The parser looks operators up by their first sign in one of two contexts:
//! where an expression has to start (`sign_start`) and right after a complete
//! expression (`exp_start`). Each group lists operator refs (positions in
//! [`OperTable::entries`]) longest pattern first, so the most specific
//! reading is tried first. Ties keep table order.

use crate::oper::{OperId, OperTable};
use indexmap::IndexMap;
use smartstring::alias::String;

/// Sign-keyed operator groups, built once per table.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    sign_start: IndexMap<String, Vec<usize>>,
    exp_start: IndexMap<String, Vec<usize>>,
}

impl GroupIndex {
    pub fn new<I: OperId>(table: &OperTable<I>) -> Self {
        let mut index = Self::default();
        for (oper, entry) in table.entries().iter().enumerate() {
            let groups = if entry.starts_with_expression() {
                &mut index.exp_start
            } else {
                &mut index.sign_start
            };
            groups
                .entry(String::from(entry.first_sign()))
                .or_default()
                .push(oper);
        }
        for group in index
            .sign_start
            .values_mut()
            .chain(index.exp_start.values_mut())
        {
            group.sort_by(|&a, &b| {
                let len = |oper: usize| table.entry(oper).def.pattern.len();
                len(b).cmp(&len(a))
            });
        }
        index
    }

    /// Operators that open a fresh expression with `sign`.
    pub fn sign_start(&self, sign: &str) -> Option<&[usize]> {
        self.sign_start.get(sign).map(Vec::as_slice)
    }

    /// Operators that continue a complete expression with `sign`.
    pub fn exp_start(&self, sign: &str) -> Option<&[usize]> {
        self.exp_start.get(sign).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oper::{OperDef, PriorityLevel, Slot};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Group,
        Call,
        Neg,
        Sub,
        Tuple,
        TupleEnd,
        Assign,
    }

    impl From<Op> for usize {
        fn from(op: Op) -> Self {
            op as usize
        }
    }

    impl OperId for Op {
        const COUNT: usize = 7;
    }

    fn table() -> OperTable<Op> {
        OperTable::try_new(vec![
            PriorityLevel::right(
                "atom",
                [OperDef::value(
                    Op::Group,
                    [Slot::sign("("), Slot::hole(), Slot::sign(")")],
                )],
            ),
            PriorityLevel::left(
                "post",
                [OperDef::chain(
                    Op::Call,
                    [Slot::sign("("), Slot::hole(), Slot::sign(")")],
                )],
            ),
            PriorityLevel::right("pref", [OperDef::chain(Op::Neg, [Slot::sign("-")])]),
            PriorityLevel::left(
                "sum",
                [OperDef::chain(Op::Sub, [Slot::sign("-"), Slot::hole()])],
            ),
            PriorityLevel::right(
                "asg",
                [OperDef::chain(Op::Assign, [Slot::hole(), Slot::sign("=")])],
            ),
            PriorityLevel::left(
                "sep",
                [
                    OperDef::chain(Op::TupleEnd, [Slot::sign(",")]),
                    OperDef::chain(Op::Tuple, [Slot::sign(","), Slot::hole()]),
                ],
            ),
        ])
        .unwrap()
    }

    fn ids(table: &OperTable<Op>, group: Option<&[usize]>) -> Vec<Op> {
        group
            .unwrap_or_default()
            .iter()
            .map(|&oper| table.entry(oper).def.id)
            .collect()
    }

    #[test]
    fn same_sign_splits_by_context() {
        let table = table();
        let index = GroupIndex::new(&table);
        assert_eq!(ids(&table, index.sign_start("(")), [Op::Group]);
        assert_eq!(ids(&table, index.exp_start("(")), [Op::Call]);
        assert_eq!(ids(&table, index.sign_start("-")), [Op::Neg]);
        assert_eq!(ids(&table, index.exp_start("-")), [Op::Sub]);
    }

    #[test]
    fn right_assoc_with_leading_hole_continues_an_expression() {
        let table = table();
        let index = GroupIndex::new(&table);
        assert_eq!(ids(&table, index.exp_start("=")), [Op::Assign]);
        assert!(index.sign_start("=").is_none());
    }

    #[test]
    fn longest_pattern_first() {
        let table = table();
        let index = GroupIndex::new(&table);
        assert_eq!(ids(&table, index.exp_start(",")), [Op::Tuple, Op::TupleEnd]);
        assert!(index.sign_start(")").is_none());
        assert!(index.exp_start(")").is_none());
    }
}
