//! Operator definitions and the priority table.
//!
//! This module defines the declarative description of a grammar: an ordered
//! list of [`PriorityLevel`]s, each holding [`OperDef`]s that share one
//! [`Assoc`]. The table is validated once by [`OperTable::try_new`] and then
//! consulted, read-only, by the tokenizer, the grouping index and the parser.
//!
//! # Overview
//! An operator is described by a slot pattern: literal signs and expression
//! holes. The operand on the side implied by associativity is *not* written
//! in the pattern:
//!
//! - a left-associative [`OperKind::Chain`] operator takes an implicit
//!   leading operand (`+ _` is binary addition, `( _ )` after an expression
//!   is a call);
//! - a right-associative chain operator takes an implicit trailing operand
//!   (`-` is negation, `_ =` is assignment);
//! - an [`OperKind::Value`] operator takes no implicit operand (`( _ )`).
//!
//! Lower level index means tighter binding.
//!
//! # Components
//! - [`OperId`]: the closed set of operator ids a table is built over.
//! - [`Assoc`], [`OperKind`], [`Slot`]: the vocabulary of definitions.
//! - [`OperDef`], [`PriorityLevel`]: what users write.
//! - [`OperTable`], [`OperEntry`]: the validated table with derived data.

use crate::error::InternalError;
use smartstring::alias::String;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;

/// The closed set of operator ids a table is built over.
///
/// Implemented by a fieldless enum, one variant per operator. `Into<usize>`
/// must map variants onto `0..COUNT`.
pub trait OperId: Copy + Debug + Eq + Into<usize> {
    /// Number of ids.
    const COUNT: usize;
}

/// Associativity of a priority level.
///
/// | Variant | Description |
/// |----------|--------------|
/// | [`Assoc::Left`]  | Left-associative or postfix: groups from left to right. |
/// | [`Assoc::Right`] | Right-associative or prefix: groups from right to left. |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Assoc {
    /// Left-associative / postfix level.
    Left = 0,
    /// Right-associative / prefix level.
    Right = 1,
}

impl Assoc {
    /// Total number of associativity variants.
    pub const COUNT: usize = 2;

    /// Canonical string representations for each variant.
    pub const STRS: &[&str] = &["left", "right"];
}

impl From<Assoc> for usize {
    fn from(a: Assoc) -> Self {
        a as usize
    }
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Assoc::STRS[usize::from(*self)])
    }
}

/// Error type returned when parsing an [`Assoc`] from a string fails.
#[derive(Debug, Clone)]
pub struct ParseAssocError(String);

impl fmt::Display for ParseAssocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid associativity: {}", self.0)
    }
}

impl std::error::Error for ParseAssocError {}

impl FromStr for Assoc {
    type Err = ParseAssocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Assoc::Left),
            "right" => Ok(Assoc::Right),
            other => Err(ParseAssocError(String::from(other))),
        }
    }
}

/// Whether an operator attaches to an adjacent expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperKind {
    /// Attaches to one adjacent expression, on the side implied by the
    /// level's associativity.
    Chain = 0,
    /// Fully delimited; never attaches to an outer expression.
    Value = 1,
}

impl OperKind {
    /// Total number of kinds.
    pub const COUNT: usize = 2;

    /// Canonical string representations for each variant.
    pub const STRS: &[&str] = &["chain", "value"];
}

impl From<OperKind> for usize {
    fn from(k: OperKind) -> Self {
        k as usize
    }
}

impl fmt::Display for OperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(OperKind::STRS[usize::from(*self)])
    }
}

/// Error type returned when parsing an [`OperKind`] from a string fails.
#[derive(Debug, Clone)]
pub struct ParseOperKindError(String);

impl fmt::Display for ParseOperKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid operator kind: {}", self.0)
    }
}

impl std::error::Error for ParseOperKindError {}

impl FromStr for OperKind {
    type Err = ParseOperKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chain" => Ok(OperKind::Chain),
            "value" => Ok(OperKind::Value),
            other => Err(ParseOperKindError(String::from(other))),
        }
    }
}

/// One element of an operator pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A literal sign.
    Sign(String),
    /// An expression hole. The optional limit names the loosest level whose
    /// operators may appear unparenthesized in the hole. It only has an effect
    /// on the trailing hole of a left-associative operator.
    Hole(Option<String>),
}

impl Slot {
    /// A literal sign slot.
    pub fn sign(sign: &str) -> Self {
        Slot::Sign(String::from(sign))
    }

    /// A hole with the default limit.
    pub fn hole() -> Self {
        Slot::Hole(None)
    }

    /// A hole accepting operators up to and including level `level`.
    pub fn hole_until(level: &str) -> Self {
        Slot::Hole(Some(String::from(level)))
    }

    /// Returns the sign of a sign slot.
    pub fn as_sign(&self) -> Option<&str> {
        match self {
            Slot::Sign(s) => Some(s.as_str()),
            Slot::Hole(_) => None,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Slot::Hole(_))
    }
}

/// Defines a single operator: its id, kind and slot pattern.
#[derive(Debug, Clone)]
pub struct OperDef<I> {
    /// Operator id.
    pub id: I,
    /// Chain or value.
    pub kind: OperKind,
    /// Slot pattern, without the implicit operand of a chain operator.
    pub pattern: Vec<Slot>,
}

impl<I> OperDef<I> {
    /// A chain operator.
    pub fn chain(id: I, pattern: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            id,
            kind: OperKind::Chain,
            pattern: pattern.into_iter().collect(),
        }
    }

    /// A value operator.
    pub fn value(id: I, pattern: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            id,
            kind: OperKind::Value,
            pattern: pattern.into_iter().collect(),
        }
    }
}

/// A priority level: operators of equal binding strength and one
/// associativity.
#[derive(Debug, Clone)]
pub struct PriorityLevel<I> {
    /// Level name, referred to by hole limits.
    pub name: String,
    /// Associativity shared by every operator of the level.
    pub assoc: Assoc,
    /// Operators of the level, in definition order.
    pub opers: Vec<OperDef<I>>,
}

impl<I> PriorityLevel<I> {
    /// Creates a level.
    pub fn new(name: &str, assoc: Assoc, opers: impl IntoIterator<Item = OperDef<I>>) -> Self {
        Self {
            name: String::from(name),
            assoc,
            opers: opers.into_iter().collect(),
        }
    }

    /// A left-associative / postfix level.
    pub fn left(name: &str, opers: impl IntoIterator<Item = OperDef<I>>) -> Self {
        Self::new(name, Assoc::Left, opers)
    }

    /// A right-associative / prefix level.
    pub fn right(name: &str, opers: impl IntoIterator<Item = OperDef<I>>) -> Self {
        Self::new(name, Assoc::Right, opers)
    }
}

/// A validated operator together with the data derived from its level.
#[derive(Debug, Clone)]
pub struct OperEntry<I> {
    /// The definition as written.
    pub def: OperDef<I>,
    /// Index of the level (lower binds tighter).
    pub priority: usize,
    /// Associativity of the level.
    pub assoc: Assoc,
    /// Index of the first sign slot; the operator is recognized by it.
    pub lead: usize,
    /// End of the explicit slots still to be matched after the lead sign.
    /// A trailing hole of a left-associative operator is excluded; it is
    /// represented by `bound` instead.
    pub rest_end: usize,
    /// Number of arguments of the AST node.
    pub arity: usize,
    /// Exclusive upper limit on the priority of operators accepted in the
    /// trailing operand, or `None` if the operator does not end with an
    /// expression.
    pub bound: Option<usize>,
}

impl<I> OperEntry<I> {
    /// The sign the operator is recognized by.
    pub fn first_sign(&self) -> &str {
        match &self.def.pattern[self.lead] {
            Slot::Sign(s) => s.as_str(),
            Slot::Hole(_) => unreachable!("lead slot is a sign"),
        }
    }

    /// Whether the operator continues an expression that was already parsed.
    pub fn starts_with_expression(&self) -> bool {
        self.def.kind == OperKind::Chain
            && (self.assoc == Assoc::Left || self.def.pattern.first().is_some_and(Slot::is_hole))
    }

    /// Whether the operator ends with an open operand.
    pub fn ends_with_expression(&self) -> bool {
        self.def.kind == OperKind::Chain
            && (self.assoc == Assoc::Right || self.def.pattern.last().is_some_and(Slot::is_hole))
    }
}

/// The validated operator table.
///
/// Built once from priority levels; every derived index (first signs, arity,
/// default hole limits) is computed here and never per parse.
///
/// # Example
/// ```rust
/// # use opgram::{OperDef, OperId, OperTable, PriorityLevel, Slot};
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Op { Add }
/// impl From<Op> for usize { fn from(op: Op) -> usize { op as usize } }
/// impl OperId for Op { const COUNT: usize = 1; }
///
/// let table = OperTable::try_new(vec![PriorityLevel::left(
///     "sum",
///     [OperDef::chain(Op::Add, [Slot::sign("+"), Slot::hole()])],
/// )])
/// .unwrap();
/// assert_eq!(table.arity(Op::Add).unwrap(), 2);
/// assert_eq!(table.signs(), ["+"]);
/// ```
#[derive(Debug, Clone)]
pub struct OperTable<I> {
    levels: Vec<(String, Assoc)>,
    entries: Vec<OperEntry<I>>,
    by_id: Vec<Option<usize>>,
    signs: Vec<String>,
}

impl<I: OperId> OperTable<I> {
    /// Validates the levels and derives the per-operator data.
    ///
    /// # Errors
    /// - [`InternalError::NoSign`] if an operator has no literal sign;
    /// - [`InternalError::DuplicateOperator`] if an id is defined twice;
    /// - [`InternalError::InvalidPattern`] if a pattern cannot be parsed with
    ///   its kind and associativity;
    /// - [`InternalError::UnknownLevel`] if a hole limit names no level.
    pub fn try_new(levels: Vec<PriorityLevel<I>>) -> Result<Self, InternalError> {
        let names: Vec<(String, Assoc)> = levels
            .iter()
            .map(|level| (level.name.clone(), level.assoc))
            .collect();
        let mut entries = Vec::new();
        let mut by_id = vec![None; I::COUNT];
        let mut signs: Vec<String> = Vec::new();

        for (priority, level) in levels.into_iter().enumerate() {
            for def in level.opers {
                let name = id_name(def.id);
                let index: usize = def.id.into();
                if index >= I::COUNT {
                    return Err(InternalError::UnknownOperator(name));
                }
                if by_id[index].is_some() {
                    return Err(InternalError::DuplicateOperator(name));
                }

                let entry = Self::derive(def, priority, level.assoc, &names)?;
                for slot in &entry.def.pattern {
                    if let Slot::Sign(sign) = slot {
                        if !signs.contains(sign) {
                            signs.push(sign.clone());
                        }
                    }
                }
                by_id[index] = Some(entries.len());
                entries.push(entry);
            }
        }

        for a in &signs {
            for b in &signs {
                if a != b && b.contains(a.as_str()) {
                    log::warn!("sign {:?} is part of sign {:?}; tokenizing depends on table order", a, b);
                }
            }
        }

        Ok(Self {
            levels: names,
            entries,
            by_id,
            signs,
        })
    }

    fn derive(
        def: OperDef<I>,
        priority: usize,
        assoc: Assoc,
        levels: &[(String, Assoc)],
    ) -> Result<OperEntry<I>, InternalError> {
        let invalid = |reason| InternalError::InvalidPattern {
            id: id_name(def.id),
            reason,
        };

        let Some(lead) = def.pattern.iter().position(|slot| !slot.is_hole()) else {
            return Err(InternalError::NoSign(id_name(def.id)));
        };
        if def.pattern.iter().any(|slot| {
            slot.as_sign()
                .is_some_and(|sign| sign.is_empty() || sign.chars().any(char::is_whitespace))
        }) {
            return Err(invalid("a sign must be non-empty and contain no whitespace"));
        }
        if def
            .pattern
            .windows(2)
            .any(|pair| pair[0].is_hole() && pair[1].is_hole())
        {
            return Err(invalid("two holes cannot be adjacent"));
        }
        let starts_with_hole = def.pattern.first().is_some_and(Slot::is_hole);
        let ends_with_hole = def.pattern.last().is_some_and(Slot::is_hole);
        match (def.kind, assoc) {
            (OperKind::Value, _) if starts_with_hole || ends_with_hole => {
                return Err(invalid("a value operator must begin and end with a sign"));
            }
            (OperKind::Chain, Assoc::Left) if starts_with_hole => {
                return Err(invalid(
                    "a left-associative chain operator cannot begin with a hole",
                ));
            }
            (OperKind::Chain, Assoc::Right) if ends_with_hole => {
                return Err(invalid(
                    "a right-associative chain operator cannot end with a hole",
                ));
            }
            _ => {}
        }

        for slot in &def.pattern {
            if let Slot::Hole(Some(limit)) = slot {
                if !levels.iter().any(|(name, _)| name == limit) {
                    return Err(InternalError::UnknownLevel {
                        id: id_name(def.id),
                        level: limit.clone(),
                    });
                }
            }
        }

        let holes = def.pattern.iter().filter(|slot| slot.is_hole()).count();
        let arity = holes + usize::from(def.kind == OperKind::Chain);
        let rest_end = def.pattern.len() - usize::from(ends_with_hole);

        let mut entry = OperEntry {
            def,
            priority,
            assoc,
            lead,
            rest_end,
            arity,
            bound: None,
        };
        if entry.ends_with_expression() {
            entry.bound = Some(match (assoc, entry.def.pattern.last()) {
                (Assoc::Right, _) => priority + 1,
                (Assoc::Left, Some(Slot::Hole(Some(limit)))) => {
                    levels
                        .iter()
                        .position(|(name, _)| name == limit)
                        .ok_or_else(|| InternalError::UnknownLevel {
                            id: id_name(entry.def.id),
                            level: limit.clone(),
                        })?
                        + 1
                }
                (Assoc::Left, _) => priority,
            });
        }
        Ok(entry)
    }

    /// Every distinct sign of the table, in table order.
    pub fn signs(&self) -> &[String] {
        &self.signs
    }

    /// Is `s` one of the table's signs?
    pub fn is_sign(&self, s: &str) -> bool {
        self.signs.iter().any(|sign| sign == s)
    }

    /// Number of priority levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Name and associativity of level `priority`.
    pub fn level(&self, priority: usize) -> Option<(&str, Assoc)> {
        self.levels
            .get(priority)
            .map(|(name, assoc)| (name.as_str(), *assoc))
    }

    /// All operators, in table order. Positions are stable operator refs.
    pub fn entries(&self) -> &[OperEntry<I>] {
        &self.entries
    }

    /// The operator at position `oper` of [`entries`](Self::entries).
    pub fn entry(&self, oper: usize) -> &OperEntry<I> {
        &self.entries[oper]
    }

    /// Looks up the position of an operator by id.
    pub fn lookup(&self, id: I) -> Option<usize> {
        self.by_id.get(id.into()).copied().flatten()
    }

    /// Looks up an operator by id.
    ///
    /// # Errors
    /// [`InternalError::UnknownOperator`] if the table does not define `id`.
    pub fn get(&self, id: I) -> Result<&OperEntry<I>, InternalError> {
        self.lookup(id)
            .map(|oper| &self.entries[oper])
            .ok_or_else(|| InternalError::UnknownOperator(id_name(id)))
    }

    /// Number of arguments of the AST node built for `id`.
    pub fn arity(&self, id: I) -> Result<usize, InternalError> {
        self.get(id).map(|entry| entry.arity)
    }
}

pub(crate) fn id_name<I: Debug>(id: I) -> String {
    String::from(format!("{:?}", id).as_str())
}
