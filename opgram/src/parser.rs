//! Backtracking precedence-climbing parser.
//!
//! The parser walks the token sequence with a parse *environment*: a cursor,
//! an expression stack, a stack of pending (recognized but not yet reduced)
//! operators, and a mode:
//!
//! - **start**: an expression has to start here;
//! - **continue**: an expression just ended; the next sign continues a pending
//!   operator or opens a new one on top of it;
//! - **sign**: one exact sign of the top pending operator is required.
//!
//! When a sign is shared by several operators the environment is forked, one
//! branch per candidate, longest pattern first. The first candidate is
//! followed; the others are kept as alternatives and resumed, most recent
//! first, when the followed branch fails. If every branch fails, the failure
//! that got furthest into the input is returned.
//!
//! Both stacks are persistent (see [`crate::stack`]) and expression nodes
//! live in an append-only arena, so an environment is a handful of integers
//! and forking is a copy.

use crate::ast::{Ast, Literal};
use crate::error::{GrammarError, InternalError, SyntaxError, SyntaxErrorKind};
use crate::group::GroupIndex;
use crate::lexer::{Token, TokenValue};
use crate::oper::{OperId, OperTable, Slot};
use crate::stack::{Stack, StackArena};

/// Counters of the most recent parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Tokens in the input.
    pub tokens: usize,
    /// Alternative branches created.
    pub forks: usize,
    /// Alternative branches resumed after a failure.
    pub backtracks: usize,
    /// Operator nodes built, in every branch.
    pub reductions: usize,
}

/// Parser over a fixed operator table.
///
/// The grouping index is built once, in [`Parser::new`]; a parser can be
/// reused for any number of inputs.
///
/// # Example
/// ```rust
/// # use opgram::{OperDef, OperId, OperTable, Parser, PriorityLevel, Slot, tokenize};
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Op { Add, Mul }
/// impl From<Op> for usize { fn from(op: Op) -> usize { op as usize } }
/// impl OperId for Op { const COUNT: usize = 2; }
///
/// let table = OperTable::try_new(vec![
///     PriorityLevel::left("term", [OperDef::chain(Op::Mul, [Slot::sign("*"), Slot::hole()])]),
///     PriorityLevel::left("sum", [OperDef::chain(Op::Add, [Slot::sign("+"), Slot::hole()])]),
/// ])
/// .unwrap();
/// let mut parser = Parser::new(&table);
/// let ast = parser.parse(&tokenize(&table, "1 + 2 * 3").unwrap()).unwrap();
/// assert_eq!(ast.id(), Some(&Op::Add));
/// assert_eq!(ast.args()[1].id(), Some(&Op::Mul));
/// ```
pub struct Parser<'a, I> {
    table: &'a OperTable<I>,
    groups: GroupIndex,
    stats: ParserStats,
}

impl<'a, I: OperId> Parser<'a, I> {
    pub fn new(table: &'a OperTable<I>) -> Self {
        Self {
            table,
            groups: GroupIndex::new(table),
            stats: ParserStats::default(),
        }
    }

    pub fn table(&self) -> &'a OperTable<I> {
        self.table
    }

    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }

    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    /// Parses a token sequence into a single expression.
    ///
    /// # Errors
    /// The furthest-progress [`SyntaxError`] if no reading of the input is
    /// accepted, or an [`InternalError`] as soon as an invariant breaks.
    pub fn parse(&mut self, tokens: &[Token]) -> Result<Ast<I>, GrammarError> {
        let mut search = Search::new(self.table, &self.groups, tokens);
        let result = search.run();
        self.stats = search.stats;
        result
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Start,
    Continue,
    Sign,
}

/// A pending operator: its position in the table and the index of its next
/// unmatched slot.
#[derive(Debug, Clone, Copy)]
struct Pending {
    oper: usize,
    next: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Env {
    cursor: usize,
    exprs: Stack,
    pending: Stack,
    mode: Mode,
}

/// An untried candidate: `oper` entered from `env`.
#[derive(Debug, Clone, Copy)]
struct Branch {
    env: Env,
    oper: usize,
}

enum Node<I> {
    Literal(Literal),
    Oper { id: I, args: Vec<usize> },
}

enum Step {
    Next(Env),
    Accept(usize),
    Fail(SyntaxErrorKind),
}

/// State of one parse. Arenas are shared by every branch.
struct Search<'a, I> {
    table: &'a OperTable<I>,
    groups: &'a GroupIndex,
    tokens: &'a [Token],
    nodes: Vec<Node<I>>,
    exprs: StackArena<usize>,
    pending: StackArena<Pending>,
    branches: Vec<Branch>,
    best: Option<SyntaxError>,
    stats: ParserStats,
}

/// Whether failure `new` should be reported instead of `old`.
fn preferred(new: &SyntaxError, old: &SyntaxError) -> bool {
    new.at > old.at || (new.at == old.at && new.kind.severity() < old.kind.severity())
}

impl<'a, I: OperId> Search<'a, I> {
    fn new(table: &'a OperTable<I>, groups: &'a GroupIndex, tokens: &'a [Token]) -> Self {
        Self {
            table,
            groups,
            tokens,
            nodes: Vec::new(),
            exprs: StackArena::new(),
            pending: StackArena::new(),
            branches: Vec::new(),
            best: None,
            stats: ParserStats {
                tokens: tokens.len(),
                ..ParserStats::default()
            },
        }
    }

    fn run(&mut self) -> Result<Ast<I>, GrammarError> {
        let mut env = Env::default();
        loop {
            let at = env.cursor;
            match self.step(env)? {
                Step::Next(next) => env = next,
                Step::Accept(root) => {
                    log::debug!(
                        "accepted after {} backtracks, {} nodes",
                        self.stats.backtracks,
                        self.nodes.len()
                    );
                    return Ok(self.build(root));
                }
                Step::Fail(kind) => {
                    let err = self.failure(kind, at);
                    let best = match self.best.take() {
                        Some(best) if !preferred(&err, &best) => best,
                        _ => err,
                    };
                    let Some(branch) = self.branches.pop() else {
                        log::debug!("all branches failed; reporting {}", best);
                        return Err(best.into());
                    };
                    self.best = Some(best);
                    self.stats.backtracks += 1;
                    env = self.enter(branch.env, branch.oper)?;
                }
            }
        }
    }

    fn failure(&self, kind: SyntaxErrorKind, at: usize) -> SyntaxError {
        let err = SyntaxError::new(kind, at, self.tokens.get(at).map(|token| token.span));
        log::trace!("branch failed: {}", err);
        err
    }

    fn step(&mut self, env: Env) -> Result<Step, InternalError> {
        let tokens = self.tokens;
        let Some(token) = tokens.get(env.cursor) else {
            return self.finish(env);
        };
        if log::log_enabled!(log::Level::Trace) {
            self.dump_state(env, token);
        }
        match (env.mode, &token.value) {
            (Mode::Start, TokenValue::Sign(sign)) => self.open(env, sign),
            (Mode::Start, TokenValue::Number(n)) => {
                Ok(Step::Next(self.push_literal(env, Literal::Number(*n))))
            }
            (Mode::Start, TokenValue::Ident(name)) => {
                Ok(Step::Next(self.push_literal(env, Literal::Ident(name.clone()))))
            }
            (Mode::Continue, TokenValue::Sign(sign)) => self.continue_with(env, sign),
            (Mode::Continue, _) => Ok(Step::Fail(SyntaxErrorKind::AdjacentExpressions)),
            (Mode::Sign, value) => {
                let required = self.required(env)?;
                match value {
                    TokenValue::Sign(sign) if sign.as_str() == required => {
                        self.consume(env).map(Step::Next)
                    }
                    _ => Ok(Step::Fail(SyntaxErrorKind::ExpectedSign(required.into()))),
                }
            }
        }
    }

    /// End of input.
    fn finish(&mut self, env: Env) -> Result<Step, InternalError> {
        match env.mode {
            Mode::Start => Ok(Step::Fail(SyntaxErrorKind::ExpressionExpected)),
            Mode::Sign => {
                let required = self.required(env)?;
                Ok(Step::Fail(SyntaxErrorKind::ExpectedSign(required.into())))
            }
            Mode::Continue => {
                if let Some((_, required)) = self.obligation(env.pending) {
                    return Ok(Step::Fail(SyntaxErrorKind::ExpectedSign(required.into())));
                }
                let mut env = env;
                while !env.pending.is_empty() {
                    env = self.reduce(env)?;
                }
                match self.exprs.peek(env.exprs) {
                    Some(&root) if env.exprs.len() == 1 => Ok(Step::Accept(root)),
                    _ => Err(InternalError::DanglingExpressions(env.exprs.len())),
                }
            }
        }
    }

    /// A sign where an expression has to start.
    fn open(&mut self, env: Env, sign: &'a str) -> Result<Step, InternalError> {
        let groups = self.groups;
        if let Some(group) = groups.sign_start(sign) {
            return self.fork(env, group).map(Step::Next);
        }
        let required = self.obligation(env.pending).map(|(_, required)| required);
        let kind = if groups.exp_start(sign).is_some() || required == Some(sign) {
            SyntaxErrorKind::NeedsOperandBefore(sign.into())
        } else {
            SyntaxErrorKind::UnexpectedSign(sign.into())
        };
        Ok(Step::Fail(kind))
    }

    /// A sign right after a complete expression.
    fn continue_with(&mut self, env: Env, sign: &'a str) -> Result<Step, InternalError> {
        if let Some((depth, required)) = self.obligation(env.pending) {
            if required == sign {
                let mut env = env;
                for _ in 0..depth {
                    env = self.reduce(env)?;
                }
                return self.consume(env).map(Step::Next);
            }
        }
        let groups = self.groups;
        match groups.exp_start(sign) {
            Some(group) => self.fork(env, group).map(Step::Next),
            None if groups.sign_start(sign).is_some() => {
                Ok(Step::Fail(SyntaxErrorKind::AdjacentExpressions))
            }
            None => Ok(Step::Fail(SyntaxErrorKind::UnexpectedSign(sign.into()))),
        }
    }

    /// Follows the first candidate of `group`; queues the rest so that the
    /// second is resumed first.
    fn fork(&mut self, env: Env, group: &[usize]) -> Result<Env, InternalError> {
        let Some((&first, rest)) = group.split_first() else {
            return Err(InternalError::StackUnderflow);
        };
        for &oper in rest.iter().rev() {
            self.branches.push(Branch { env, oper });
        }
        self.stats.forks += rest.len();
        self.enter(env, first)
    }

    /// Consumes the lead sign of `oper` and makes it pending.
    fn enter(&mut self, env: Env, oper: usize) -> Result<Env, InternalError> {
        let table = self.table;
        let entry = table.entry(oper);
        let mut env = env;
        if env.mode == Mode::Continue {
            env = self.unwind(env, entry.priority)?;
        }
        log::trace!("enter {:?} at token {}", entry.def.id, env.cursor);
        env.pending = self.pending.push(
            env.pending,
            Pending {
                oper,
                next: entry.lead + 1,
            },
        );
        env.cursor += 1;
        self.advance(env)
    }

    /// Reduces every pending operator whose trailing operand is complete and
    /// binds tighter than an incoming operator of `priority`.
    fn unwind(&mut self, env: Env, priority: usize) -> Result<Env, InternalError> {
        let table = self.table;
        let mut env = env;
        while let Some(&top) = self.pending.peek(env.pending) {
            let entry = table.entry(top.oper);
            match entry.bound {
                Some(bound) if top.next >= entry.rest_end && bound <= priority => {
                    env = self.reduce(env)?;
                }
                _ => break,
            }
        }
        Ok(env)
    }

    /// Consumes the sign the top pending operator is waiting for.
    fn consume(&mut self, env: Env) -> Result<Env, InternalError> {
        let (below, &top) = self
            .pending
            .pop(env.pending)
            .ok_or(InternalError::StackUnderflow)?;
        let mut env = env;
        env.pending = self.pending.push(
            below,
            Pending {
                next: top.next + 1,
                ..top
            },
        );
        env.cursor += 1;
        self.advance(env)
    }

    /// Sets the mode from the next slot of the top pending operator, reducing
    /// it if it has nothing left to match.
    fn advance(&mut self, env: Env) -> Result<Env, InternalError> {
        let (below, &top) = self
            .pending
            .pop(env.pending)
            .ok_or(InternalError::StackUnderflow)?;
        let entry = self.table.entry(top.oper);
        let mut env = env;
        if top.next < entry.rest_end {
            if entry.def.pattern[top.next].is_hole() {
                env.pending = self.pending.push(
                    below,
                    Pending {
                        next: top.next + 1,
                        ..top
                    },
                );
                env.mode = Mode::Start;
            } else {
                env.mode = Mode::Sign;
            }
        } else if entry.bound.is_some() {
            env.mode = Mode::Start;
        } else {
            env = self.reduce(env)?;
            env.mode = Mode::Continue;
        }
        Ok(env)
    }

    /// Pops the top pending operator and its arguments; pushes the node.
    fn reduce(&mut self, env: Env) -> Result<Env, InternalError> {
        let table = self.table;
        let (pending, &top) = self
            .pending
            .pop(env.pending)
            .ok_or(InternalError::StackUnderflow)?;
        let entry = table.entry(top.oper);
        let mut args = vec![0; entry.arity];
        let mut exprs = env.exprs;
        for arg in args.iter_mut().rev() {
            let (below, &expr) = self
                .exprs
                .pop(exprs)
                .ok_or(InternalError::StackUnderflow)?;
            *arg = expr;
            exprs = below;
        }
        log::trace!("reduce {:?} with {} args", entry.def.id, args.len());
        self.nodes.push(Node::Oper {
            id: entry.def.id,
            args,
        });
        self.stats.reductions += 1;
        Ok(Env {
            exprs: self.exprs.push(exprs, self.nodes.len() - 1),
            pending,
            ..env
        })
    }

    fn push_literal(&mut self, env: Env, literal: Literal) -> Env {
        self.nodes.push(Node::Literal(literal));
        Env {
            cursor: env.cursor + 1,
            exprs: self.exprs.push(env.exprs, self.nodes.len() - 1),
            mode: Mode::Continue,
            ..env
        }
    }

    /// The sign a pending operator waits for next, if any.
    fn slot_sign(&self, pending: Pending) -> Option<&'a str> {
        let table = self.table;
        table
            .entry(pending.oper)
            .def
            .pattern
            .get(pending.next)
            .and_then(Slot::as_sign)
    }

    /// The nearest pending operator still waiting for a sign: its depth from
    /// the top and the sign.
    fn obligation(&self, pending: Stack) -> Option<(usize, &'a str)> {
        self.pending
            .iter(pending)
            .enumerate()
            .find_map(|(depth, &p)| self.slot_sign(p).map(|sign| (depth, sign)))
    }

    /// The sign required in sign mode.
    fn required(&self, env: Env) -> Result<&'a str, InternalError> {
        self.pending
            .peek(env.pending)
            .and_then(|&p| self.slot_sign(p))
            .ok_or(InternalError::StackUnderflow)
    }

    fn build(&self, node: usize) -> Ast<I> {
        match &self.nodes[node] {
            Node::Literal(literal) => Ast::Literal(literal.clone()),
            Node::Oper { id, args } => Ast::Oper {
                id: *id,
                args: args.iter().map(|&arg| self.build(arg)).collect(),
            },
        }
    }

    fn dump_state(&self, env: Env, incoming: &Token) {
        let pending: Vec<String> = self
            .pending
            .iter(env.pending)
            .map(|p| format!("{:?}@{}", self.table.entry(p.oper).def.id, p.next))
            .collect();
        log::trace!(
            "{:?} #{} <- {:?}  pending [{}]  exprs {}  branches {}",
            env.mode,
            env.cursor,
            incoming.value,
            pending.join(" "),
            env.exprs.len(),
            self.branches.len(),
        );
    }
}
