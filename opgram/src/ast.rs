//! The abstract syntax tree produced by the parser.
//!
//! A node is either an operator application, holding its arguments in source
//! order, or a literal leaf. For a left-associative chain operator the implicit
//! leading operand comes first; for a right-associative one the implicit
//! trailing operand comes last.
//!
//! [`Ast::render`] prints a tree back as space-separated tokens. Every sign of
//! every operator is kept in the tree, so rendering an accepted tree and
//! parsing the result yields an equal tree.

use crate::error::InternalError;
use crate::oper::{Assoc, OperId, OperKind, OperTable, Slot, id_name};
use smartstring::alias::String;
use std::fmt;

/// A literal leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A finite real number.
    Number(f64),
    /// A name.
    Ident(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Ident(s) => f.write_str(s),
        }
    }
}

impl Literal {
    /// Source text that tokenizes back to the same literal under any table.
    ///
    /// Numbers are printed as an integer mantissa with a decimal exponent
    /// (`0.01` as `1e-2`, `1.5` as `15e-1`), so they never contain a `.`,
    /// which a table may use as a sign.
    pub fn to_source(&self) -> std::string::String {
        match self {
            Literal::Number(n) => number_source(*n),
            Literal::Ident(s) => s.to_string(),
        }
    }
}

fn number_source(n: f64) -> std::string::String {
    let sci = format!("{:e}", n);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let exp = exp - frac.len() as i32;
    match exp {
        0 => format!("{int}{frac}"),
        1..=6 => format!("{int}{frac}{}", "0".repeat(exp as usize)),
        _ => format!("{int}{frac}e{exp}"),
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast<I> {
    /// An operator application; `args.len()` equals the operator's arity.
    Oper { id: I, args: Vec<Ast<I>> },
    /// A literal leaf.
    Literal(Literal),
}

impl<I> Ast<I> {
    pub fn number(n: f64) -> Self {
        Ast::Literal(Literal::Number(n))
    }

    pub fn ident(name: &str) -> Self {
        Ast::Literal(Literal::Ident(String::from(name)))
    }

    pub fn oper(id: I, args: impl IntoIterator<Item = Ast<I>>) -> Self {
        Ast::Oper {
            id,
            args: args.into_iter().collect(),
        }
    }

    /// The operator id of an application node.
    pub fn id(&self) -> Option<&I> {
        match self {
            Ast::Oper { id, .. } => Some(id),
            Ast::Literal(_) => None,
        }
    }

    /// Arguments of an application node; empty for a leaf.
    pub fn args(&self) -> &[Ast<I>] {
        match self {
            Ast::Oper { args, .. } => args,
            Ast::Literal(_) => &[],
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Ast::Literal(Literal::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Total number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.args().iter().map(Ast::size).sum::<usize>()
    }
}

impl<I: OperId> Ast<I> {
    /// Prints the tree as source text, one space between tokens.
    ///
    /// # Errors
    /// [`InternalError::UnknownOperator`] if a node's id is not in `table`,
    /// [`InternalError::ArityMismatch`] if a node has the wrong number of
    /// arguments.
    pub fn render(&self, table: &OperTable<I>) -> Result<std::string::String, InternalError> {
        let mut out = Vec::new();
        self.render_into(table, &mut out)?;
        Ok(out.join(" "))
    }

    fn render_into(
        &self,
        table: &OperTable<I>,
        out: &mut Vec<std::string::String>,
    ) -> Result<(), InternalError> {
        let (id, args) = match self {
            Ast::Literal(lit) => {
                out.push(lit.to_source());
                return Ok(());
            }
            Ast::Oper { id, args } => (*id, args),
        };
        let entry = table.get(id)?;
        if args.len() != entry.arity {
            return Err(InternalError::ArityMismatch {
                id: id_name(id),
                expected: entry.arity,
                found: args.len(),
            });
        }

        let mut args = args.iter();
        let chain = entry.def.kind == OperKind::Chain;
        if chain && entry.assoc == Assoc::Left {
            if let Some(arg) = args.next() {
                arg.render_into(table, out)?;
            }
        }
        for slot in &entry.def.pattern {
            match slot {
                Slot::Sign(sign) => out.push(sign.to_string()),
                Slot::Hole(_) => {
                    if let Some(arg) = args.next() {
                        arg.render_into(table, out)?;
                    }
                }
            }
        }
        // right chain: implicit trailing operand
        for arg in args {
            arg.render_into(table, out)?;
        }
        Ok(())
    }
}

/// S-expression form: `add(2, mul(3, 4))`.
impl<I: fmt::Display> fmt::Display for Ast<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Literal(lit) => write!(f, "{}", lit),
            Ast::Oper { id, args } => {
                write!(f, "{}(", id)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oper::{OperDef, PriorityLevel};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Group,
        Call,
        Neg,
        Add,
        Assign,
    }

    impl From<Op> for usize {
        fn from(op: Op) -> Self {
            op as usize
        }
    }

    impl OperId for Op {
        const COUNT: usize = 5;
    }

    impl fmt::Display for Op {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Op::Group => "group",
                Op::Call => "call",
                Op::Neg => "neg",
                Op::Add => "add",
                Op::Assign => "assign",
            };
            f.write_str(name)
        }
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
                [OperDef::chain(Op::Add, [Slot::sign("+"), Slot::hole()])],
            ),
            PriorityLevel::right(
                "asg",
                [OperDef::chain(Op::Assign, [Slot::hole(), Slot::sign("=")])],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn renders_operands_on_their_implicit_side() {
        let table = table();
        let ast = Ast::oper(
            Op::Assign,
            [
                Ast::ident("x"),
                Ast::oper(
                    Op::Add,
                    [
                        Ast::oper(Op::Call, [Ast::ident("f"), Ast::number(1.5)]),
                        Ast::oper(Op::Neg, [Ast::oper(Op::Group, [Ast::number(2.0)])]),
                    ],
                ),
            ],
        );
        assert_eq!(ast.render(&table).unwrap(), "x = f ( 15e-1 ) + - ( 2 )");
        assert_eq!(ast.size(), 9);
    }

    #[test]
    fn numbers_render_without_a_decimal_point() {
        let cases = [
            (0.0, "0"),
            (2.0, "2"),
            (1500.0, "1500"),
            (1e7, "1e7"),
            (0.01, "1e-2"),
            (1.5, "15e-1"),
            (0.25, "25e-2"),
            (1e300, "1e300"),
            (5e-324, "5e-324"),
        ];
        for (n, text) in cases {
            let rendered = Literal::Number(n).to_source();
            assert_eq!(rendered, text);
            assert_eq!(rendered.parse::<f64>().unwrap(), n);
        }
        assert_eq!(Literal::Number(0.01).to_string(), "0.01");
    }

    #[test]
    fn fractions_reparse_when_dot_is_a_sign() {
        use crate::parse_str;
        let table = OperTable::try_new(vec![
            PriorityLevel::left(
                "post",
                [OperDef::chain(Op::Call, [Slot::sign("."), Slot::hole()])],
            ),
            PriorityLevel::right("pref", [OperDef::chain(Op::Neg, [Slot::sign("-")])]),
            PriorityLevel::left(
                "sum",
                [OperDef::chain(Op::Add, [Slot::sign("+"), Slot::hole()])],
            ),
        ])
        .unwrap();
        let ast = Ast::oper(Op::Add, [Ast::number(0.01), Ast::number(1.5)]);
        let rendered = ast.render(&table).unwrap();
        assert_eq!(rendered, "1e-2 + 15e-1");
        assert_eq!(parse_str(&table, &rendered).unwrap(), ast);
    }

    #[test]
    fn displays_as_s_expression() {
        let ast = Ast::oper(
            Op::Add,
            [Ast::number(2.0), Ast::oper(Op::Neg, [Ast::ident("y")])],
        );
        assert_eq!(ast.to_string(), "add(2, neg(y))");
        assert_eq!(ast.id(), Some(&Op::Add));
        assert_eq!(ast.args()[0].as_number(), Some(2.0));
    }

    #[test]
    fn render_checks_arity() {
        let table = table();
        let ast = Ast::oper(Op::Add, [Ast::number(1.0)]);
        assert_eq!(
            ast.render(&table),
            Err(InternalError::ArityMismatch {
                id: "Add".into(),
                expected: 2,
                found: 1
            })
        );
    }
}
