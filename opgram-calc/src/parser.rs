//! # Calculator parser
//!
//! [`CalcParser`] ties an operator table over [`CalcOper`] ids to an
//! [`opgram::Parser`] and parses source text straight into an [`Ast`].
//!
//! ```rust
//! # use opgram_calc::CalcParser;
//! let mut parser = CalcParser::default();
//! let ast = parser.parse("hello = 1 + 2 * 3").unwrap();
//! assert_eq!(ast.to_string(), "assign(hello, add(1, mul(2, 3)))");
//! ```

use crate::{CalcError, CalcOper, reference};
use opgram::{Ast, GrammarError, OperTable, Parser, ParserStats, Token, tokenize};

/// Parser for the calculator language, or for any table over [`CalcOper`].
pub struct CalcParser<'a> {
    parser: Parser<'a, CalcOper>,
}

impl<'a> CalcParser<'a> {
    pub fn new(table: &'a OperTable<CalcOper>) -> Self {
        Self {
            parser: Parser::new(table),
        }
    }

    pub fn table(&self) -> &'a OperTable<CalcOper> {
        self.parser.table()
    }

    /// The token stream of `source`.
    pub fn tokens(&self, source: &str) -> Result<Vec<Token>, CalcError> {
        Ok(tokenize(self.table(), source).map_err(GrammarError::from)?)
    }

    /// Parses `source` into one expression.
    pub fn parse(&mut self, source: &str) -> Result<Ast<CalcOper>, CalcError> {
        let tokens = self.tokens(source)?;
        let ast = self.parser.parse(&tokens)?;
        log::debug!("{:?}", self.parser.stats());
        Ok(ast)
    }

    /// Prints `ast` back as source text.
    pub fn render(&self, ast: &Ast<CalcOper>) -> Result<String, CalcError> {
        Ok(ast.render(self.table())?)
    }

    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }
}

impl Default for CalcParser<'static> {
    /// A parser over the reference table.
    fn default() -> Self {
        Self::new(reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opgram::{SyntaxErrorKind, TokenValue};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sexpr(source: &str) -> String {
        init_logger();
        match CalcParser::default().parse(source) {
            Ok(ast) => ast.to_string(),
            Err(e) => panic!("{source:?}: {e}"),
        }
    }

    fn syntax(source: &str) -> (SyntaxErrorKind, usize) {
        init_logger();
        match CalcParser::default().parse(source) {
            Err(CalcError::Grammar(GrammarError::Syntax(e))) => (e.kind, e.at),
            other => panic!("{source:?}: expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn parses_statements() {
        assert_eq!(
            sexpr("hello = 1 ;\n 1 + 2 ;\n ( world + hello + 10 ) * - 2 ;"),
            "seq_end(seq(seq(assign(hello, 1), add(1, 2)), \
             mul(group(add(add(world, hello), 10)), neg(2))))"
        );
        assert_eq!(sexpr("a ; b"), "seq(a, b)");
    }

    #[test]
    fn respects_operator_precedence_and_unary_minus() {
        assert_eq!(sexpr("2 + 3 * 4"), "add(2, mul(3, 4))");
        assert_eq!(sexpr("2 * 3 + 4 * 5"), "add(mul(2, 3), mul(4, 5))");
        assert_eq!(sexpr("- 2 + 3"), "add(neg(2), 3)");
        assert_eq!(sexpr("-(1 + 2) * 3"), "mul(neg(group(add(1, 2))), 3)");
        assert_eq!(sexpr("1000 - - - 123"), "sub(1000, neg(neg(123)))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(sexpr("( 2 + 3 ) * 4"), "mul(group(add(2, 3)), 4)");
        assert_eq!(sexpr("(1 + 2) * 3"), "mul(group(add(1, 2)), 3)");
    }

    #[test]
    fn postfix_operators() {
        assert_eq!(sexpr("f ( 1 , 2 )"), "call(f, tuple(1, 2))");
        assert_eq!(sexpr("xs [ 0 ] [ 1 ]"), "index(index(xs, 0), 1)");
        assert_eq!(sexpr("f ( x ) { y }"), "block_call(call(f, x), y)");
        assert_eq!(sexpr("o # k"), "special(o, k)");
        assert_eq!(sexpr("# x . y"), "member(global(x), y)");
        assert_eq!(sexpr("- f ( 1 )"), "neg(call(f, 1))");
    }

    #[test]
    fn delimited_values() {
        assert_eq!(sexpr("[ 1 , 2 , ]"), "list(tuple_end(tuple(1, 2)))");
        assert_eq!(sexpr("{ $ x = 1 ; }"), "block(seq_end(assign(local(x), 1)))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(sexpr("x = y = 1"), "assign(x, assign(y, 1))");
        assert_eq!(sexpr("x = 1 , 2"), "tuple(assign(x, 1), 2)");
    }

    #[test]
    fn comparisons() {
        assert_eq!(sexpr("a == b"), "eq(a, b)");
        assert_eq!(sexpr("a != b"), "ne(a, b)");
        assert_eq!(sexpr("a < b + 1"), "lt(a, add(b, 1))");
        assert_eq!(sexpr("a < b < c"), "lt(lt(a, b), c)");
    }

    #[test]
    fn shorter_signs_cut_first() {
        let parser = CalcParser::default();
        let signs = |source| -> Vec<TokenValue> {
            parser
                .tokens(source)
                .unwrap()
                .into_iter()
                .map(|t| t.value)
                .collect()
        };
        assert_eq!(
            signs("a <= b"),
            [
                TokenValue::Ident("a".into()),
                TokenValue::Sign("<".into()),
                TokenValue::Sign("=".into()),
                TokenValue::Ident("b".into()),
            ]
        );
        assert_eq!(
            syntax("a <= b"),
            (SyntaxErrorKind::NeedsOperandBefore("=".into()), 2)
        );
        // `.` is a sign, so a decimal point reads as member access
        assert_eq!(signs("1.5").len(), 3);
        assert_eq!(sexpr("1.5"), "member(1, 5)");
    }

    #[test]
    fn exponent_is_one_number() {
        let tokens = CalcParser::default().tokens("1e+5").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].number(), Some(1e5));
        assert_eq!(sexpr("2 * 1e-2"), "mul(2, 0.01)");
    }

    #[test]
    fn reports_syntax_errors() {
        assert_eq!(syntax("( 2 + 3"), (SyntaxErrorKind::ExpectedSign(")".into()), 4));
        assert_eq!(syntax("2 3"), (SyntaxErrorKind::AdjacentExpressions, 1));
        assert_eq!(syntax(""), (SyntaxErrorKind::ExpressionExpected, 0));
        assert_eq!(
            syntax("1 + 12abc"),
            (SyntaxErrorKind::MalformedNumber("12abc".into()), 2)
        );
        assert_eq!(syntax("f ( 1 ]"), (SyntaxErrorKind::UnexpectedSign("]".into()), 3));
    }

    #[test]
    fn rendering_reparses_to_the_same_tree() {
        init_logger();
        let mut parser = CalcParser::default();
        for source in [
            "hello = 1 ; 1 + 2 ; ( world + hello + 10 ) * - 2 ;",
            "f ( x , y ) { z } [ 0 ] # k",
            "[ 1 , 2 , ] == { $ a = # b ; }",
            "x = y = 3 * - ( 4 - 2 ) / 1e+10",
            "2 * 1e-2 - 15e-1 . x + 25e-2",
            "f ( 125e-3 , 3e+1 ) [ 1e-300 ]",
        ] {
            let ast = parser.parse(source).unwrap();
            let rendered = parser.render(&ast).unwrap();
            assert_eq!(parser.parse(&rendered).unwrap(), ast, "{rendered}");
        }
    }

    #[test]
    fn fractions_render_with_an_exponent() {
        init_logger();
        let mut parser = CalcParser::default();
        let ast = parser.parse("2 * 1e-2").unwrap();
        assert_eq!(ast.to_string(), "mul(2, 0.01)");
        let rendered = parser.render(&ast).unwrap();
        assert_eq!(rendered, "2 * 1e-2");
        assert_eq!(parser.parse(&rendered).unwrap(), ast);
    }

    #[test]
    fn stats_follow_the_last_parse() {
        init_logger();
        let mut parser = CalcParser::default();
        parser.parse("1 , 2 ,").unwrap();
        let stats = parser.stats();
        assert_eq!(stats.tokens, 4);
        assert_eq!(stats.forks, 2);
        assert_eq!(stats.backtracks, 1);
    }

    mod generated {
        use super::*;
        use opgram::{Assoc, OperEntry};
        use proptest::prelude::*;

        /// Loosest priority an operator on the right spine of `ast` still accepts.
        fn reach(ast: &Ast<CalcOper>) -> usize {
            let Ast::Oper { id, args } = ast else {
                return 0;
            };
            match reference().get(*id).unwrap().bound {
                Some(bound) => bound.max(args.last().map_or(0, reach)),
                None => 0,
            }
        }

        /// Whether `arg` reads back unchanged as argument `at` of `parent`.
        fn fits(parent: &OperEntry<CalcOper>, at: usize, arg: &Ast<CalcOper>) -> bool {
            let Some(id) = arg.id() else {
                return true;
            };
            let child = reference().get(*id).unwrap();
            if parent.starts_with_expression() && at == 0 {
                let same_left = child.priority == parent.priority && parent.assoc == Assoc::Left;
                (child.priority < parent.priority || same_left) && reach(arg) <= parent.priority
            } else if at + 1 == parent.arity && parent.ends_with_expression() {
                parent.bound.is_some_and(|bound| child.priority < bound)
            } else {
                true
            }
        }

        fn build(id: CalcOper, args: Vec<Ast<CalcOper>>) -> Ast<CalcOper> {
            let parent = reference().get(id).unwrap();
            let args = args
                .into_iter()
                .take(parent.arity)
                .enumerate()
                .map(|(at, arg)| {
                    if fits(parent, at, &arg) {
                        arg
                    } else {
                        Ast::oper(CalcOper::Group, [arg])
                    }
                });
            Ast::oper(id, args)
        }

        fn literal() -> impl Strategy<Value = Ast<CalcOper>> {
            prop_oneof![
                (0u32..10_000).prop_map(|n| Ast::<CalcOper>::number(n as f64)),
                (1u32..10_000, -8i32..8)
                    .prop_map(|(m, e)| Ast::<CalcOper>::number(m as f64 * 10f64.powi(e))),
                any::<f64>()
                    .prop_map(f64::abs)
                    .prop_filter("finite", |n| n.is_finite())
                    .prop_map(Ast::<CalcOper>::number),
                "[a-z]{1,3}".prop_map(|s| Ast::<CalcOper>::ident(&s)),
            ]
        }

        fn tree() -> impl Strategy<Value = Ast<CalcOper>> {
            // `<=`, `>=` and `$=` are cut by their shorter signs and never parse
            let ids: Vec<CalcOper> = CalcOper::ALL
                .into_iter()
                .filter(|id| !matches!(id, CalcOper::Le | CalcOper::Ge | CalcOper::Update))
                .collect();
            literal().prop_recursive(4, 48, 2, move |inner| {
                (prop::sample::select(ids.clone()), prop::collection::vec(inner, 2))
                    .prop_map(|(id, args)| build(id, args))
            })
        }

        proptest! {
            #[test]
            fn rendered_trees_parse_back(ast in tree()) {
                let mut parser = CalcParser::default();
                let rendered = parser.render(&ast).unwrap();
                let parsed = parser.parse(&rendered);
                prop_assert_eq!(parsed.ok(), Some(ast), "{}", rendered);
            }
        }
    }
}
