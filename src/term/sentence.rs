//! Logical sentences: lists whose head is a connective or quantifier.
//!
//! A [`Sentence`] stores exactly what a [`TermList`] stores and writes the
//! same way. On top of that it knows its [`LogicalOperator`] and keeps the set
//! of variables its own quantifier binds, recomputed whenever the storage
//! changes.

use std::fmt;

use super::{Term, TermList, Variable};

/// Connectives and quantifiers the codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
    Implies,
    Equiv,
    Xor,
    /// `(forAll ?X body)`
    ForAll,
    /// `(thereExists ?X body)`
    ThereExists,
    /// `(thereExistAtLeast N ?X body)`
    ThereExistAtLeast,
    /// `(thereExistAtMost N ?X body)`
    ThereExistAtMost,
    /// `(thereExistExactly N ?X body)`
    ThereExistExactly,
}

impl LogicalOperator {
    pub const ALL: [LogicalOperator; 11] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::Implies,
        Self::Equiv,
        Self::Xor,
        Self::ForAll,
        Self::ThereExists,
        Self::ThereExistAtLeast,
        Self::ThereExistAtMost,
        Self::ThereExistExactly,
    ];

    /// Wire name of the operator.
    pub fn label(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Implies => "implies",
            Self::Equiv => "equiv",
            Self::Xor => "xor",
            Self::ForAll => "forAll",
            Self::ThereExists => "thereExists",
            Self::ThereExistAtLeast => "thereExistAtLeast",
            Self::ThereExistAtMost => "thereExistAtMost",
            Self::ThereExistExactly => "thereExistExactly",
        }
    }

    /// Parse an operator from its wire name (case-sensitive).
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.label() == s)
    }

    /// Operator named by a symbol or constant head.
    pub fn from_term(term: &Term) -> Option<Self> {
        term.operator_name().and_then(Self::from_label)
    }

    pub fn is_quantifier(self) -> bool {
        self.binding_position().is_some()
    }

    /// Index within the sentence list of the bound variable slot.
    pub fn binding_position(self) -> Option<usize> {
        match self {
            Self::ForAll | Self::ThereExists => Some(1),
            Self::ThereExistAtLeast | Self::ThereExistAtMost | Self::ThereExistExactly => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A list with logical-sentence semantics.
#[derive(Debug, Clone)]
pub struct Sentence {
    list: TermList,
    bound: Vec<Variable>,
}

impl Sentence {
    /// Wrap list storage as a sentence.
    pub fn from_list(list: TermList) -> Self {
        let mut sentence = Self {
            list,
            bound: Vec::new(),
        };
        sentence.rebind();
        sentence
    }

    /// `(operator operands...)`
    pub fn new(operator: Term, operands: Vec<Term>) -> Self {
        Self::from_list(std::iter::once(operator).chain(operands).collect())
    }

    /// `(op operands...)` for a known connective.
    pub fn compose(op: LogicalOperator, operands: Vec<Term>) -> Self {
        Self::new(Term::symbol(op.label()), operands)
    }

    /// `(forAll ?var body)`
    pub fn for_all(var: Variable, body: Term) -> Self {
        Self::compose(LogicalOperator::ForAll, vec![Term::Variable(var), body])
    }

    /// `(thereExists ?var body)`
    pub fn there_exists(var: Variable, body: Term) -> Self {
        Self::compose(LogicalOperator::ThereExists, vec![Term::Variable(var), body])
    }

    pub fn as_list(&self) -> &TermList {
        &self.list
    }

    pub fn into_list(self) -> TermList {
        self.list
    }

    /// Mutable storage. Callers must call [`Sentence::rebind`] afterwards.
    pub(crate) fn list_mut(&mut self) -> &mut TermList {
        &mut self.list
    }

    pub fn operator(&self) -> Option<&Term> {
        self.list.head()
    }

    pub fn operands(&self) -> &[Term] {
        self.list.rest()
    }

    /// Number of operands.
    pub fn arity(&self) -> usize {
        self.operands().len()
    }

    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        self.operator().and_then(LogicalOperator::from_term)
    }

    pub fn is_quantified(&self) -> bool {
        self.logical_operator()
            .is_some_and(LogicalOperator::is_quantifier)
    }

    /// Variables bound by this sentence's own quantifier, in order.
    pub fn bound_variables(&self) -> &[Variable] {
        &self.bound
    }

    /// Recompute the bound-variable set from the current storage.
    pub fn rebind(&mut self) {
        self.bound = binding_slot_variables(&self.list);
    }

    /// Replace the operand at `index` (0-based, after the operator).
    pub fn set_operand(&mut self, index: usize, term: Term) -> Option<Term> {
        let slot = self.list.elements_mut().get_mut(index.checked_add(1)?)?;
        let old = std::mem::replace(slot, term);
        self.rebind();
        Some(old)
    }
}

/// Variables occurring in the binding slot of a quantified list.
///
/// A slot may hold a single variable or a list of variables.
pub(crate) fn binding_slot_variables(list: &TermList) -> Vec<Variable> {
    let Some(position) = list
        .head()
        .and_then(LogicalOperator::from_term)
        .and_then(LogicalOperator::binding_position)
    else {
        return Vec::new();
    };
    match list.elements().get(position) {
        Some(Term::Variable(v)) => vec![v.clone()],
        Some(slot) => slot
            .as_list()
            .map(|vars| {
                vars.children()
                    .filter_map(Term::as_variable)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.list == other.list
    }
}

impl Eq for Sentence {}

impl std::hash::Hash for Sentence {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.list.hash(state);
    }
}
