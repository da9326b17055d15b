//! The term model: a closed enum over everything that can travel on the wire.
//!
//! Every consumer matches on [`Term`] exhaustively. Atomic variants carry
//! their data inline; [`TermList`], [`Sentence`] and [`Nart`] own their
//! children, so term trees are acyclic by construction.
//!
//! Equality is structural, with three refinements:
//! - [`Constant`]s compare by GUID,
//! - [`Nart`]s compare by GUID when indexed and by structure otherwise,
//! - a [`Sentence`] equals a [`TermList`] with the same storage, since both
//!   have the same wire shape.

pub mod constant;
pub mod list;
pub mod nart;
pub mod sentence;

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

pub use constant::{Constant, Guid};
pub use list::TermList;
pub use nart::Nart;
pub use sentence::{LogicalOperator, Sentence};

// ---------------------------------------------------------------------------
// Atoms
// ---------------------------------------------------------------------------

/// An uninterpreted name, optionally qualified by a namespace (`ns:name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub namespace: Option<String>,
    pub name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    pub fn qualified(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A self-evaluating symbol, written `:name`. Stores the name without the colon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(pub String);

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Keyword(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// How a variable is spelled and what the remote engine does with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariableKind {
    /// `?X`: an ordinary logic variable.
    Normal,
    /// `??X`: a variable whose bindings are not reported back.
    DontCare,
    /// `:X`: a template meta-variable. Reads back as a keyword.
    Meta,
}

impl VariableKind {
    /// Wire prefix for this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            VariableKind::Normal => "?",
            VariableKind::DontCare => "??",
            VariableKind::Meta => ":",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::DontCare => write!(f, "dont-care"),
            Self::Meta => write!(f, "meta"),
        }
    }
}

/// A logic variable. The name is stored without its prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
}

impl Variable {
    /// An ordinary `?name` variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Normal,
        }
    }

    /// A `??name` variable.
    pub fn dont_care(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::DontCare,
        }
    }

    /// A `:name` meta-variable.
    pub fn meta(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Meta,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}

/// A numeric literal: an exact integer of any size or a float.
///
/// `1` and `1.0` are different terms. Floats compare bitwise so that `Term`
/// can be `Eq` and `Hash`.
#[derive(Debug, Clone)]
pub enum Number {
    Integer(BigInt),
    Float(f64),
}

impl Number {
    /// The value as an `i64`, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => i.to_i64(),
            Number::Float(_) => None,
        }
    }

    /// The value as an `f64` (lossy for huge integers).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Integer(i) => i.to_f64(),
            Number::Float(f) => Some(*f),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Integer(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            Number::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Integer(BigInt::from(v))
    }
}

impl From<BigInt> for Number {
    fn from(v: BigInt) -> Self {
        Number::Integer(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// A wire term.
#[derive(Debug, Clone)]
pub enum Term {
    Symbol(Symbol),
    Keyword(Keyword),
    Variable(Variable),
    Number(Number),
    /// A string literal, stored unescaped.
    Text(String),
    Constant(Constant),
    List(TermList),
    Nart(Nart),
    Sentence(Sentence),
    /// A form the remote engine must not evaluate.
    Quoted(Box<Term>),
}

/// Discriminant of a [`Term`], for diagnostics and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Symbol,
    Keyword,
    Variable,
    Number,
    Text,
    Constant,
    List,
    Nart,
    Sentence,
    Quoted,
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Symbol => "symbol",
            Self::Keyword => "keyword",
            Self::Variable => "variable",
            Self::Number => "number",
            Self::Text => "text",
            Self::Constant => "constant",
            Self::List => "list",
            Self::Nart => "nart",
            Self::Sentence => "sentence",
            Self::Quoted => "quoted",
        };
        f.write_str(label)
    }
}

impl Term {
    // -- constructors -------------------------------------------------------

    pub fn symbol(name: impl Into<String>) -> Self {
        Term::Symbol(Symbol::new(name))
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        Term::Keyword(Keyword::new(name))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(Variable::new(name))
    }

    pub fn int(v: i64) -> Self {
        Term::Number(Number::from(v))
    }

    pub fn float(v: f64) -> Self {
        Term::Number(Number::Float(v))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Term::Text(s.into())
    }

    /// A proper list.
    pub fn list(elements: Vec<Term>) -> Self {
        Term::List(TermList::proper(elements))
    }

    /// An improper list `(elements... . tail)`.
    pub fn dotted(elements: Vec<Term>, tail: Term) -> Self {
        Term::List(TermList::dotted(elements, tail))
    }

    /// The empty list `()`.
    pub fn nil() -> Self {
        Term::List(TermList::new())
    }

    pub fn quote(inner: Term) -> Self {
        Term::Quoted(Box::new(inner))
    }

    // -- inspection ---------------------------------------------------------

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Symbol(_) => TermKind::Symbol,
            Term::Keyword(_) => TermKind::Keyword,
            Term::Variable(_) => TermKind::Variable,
            Term::Number(_) => TermKind::Number,
            Term::Text(_) => TermKind::Text,
            Term::Constant(_) => TermKind::Constant,
            Term::List(_) => TermKind::List,
            Term::Nart(_) => TermKind::Nart,
            Term::Sentence(_) => TermKind::Sentence,
            Term::Quoted(_) => TermKind::Quoted,
        }
    }

    /// Whether the term has no addressable children.
    ///
    /// Narts are atomic for the knowledge base but still composite for the
    /// tree algebra, so they are *not* atoms here.
    pub fn is_atom(&self) -> bool {
        !matches!(
            self,
            Term::List(_) | Term::Nart(_) | Term::Sentence(_) | Term::Quoted(_)
        )
    }

    /// List storage of a list or sentence.
    pub fn as_list(&self) -> Option<&TermList> {
        match self {
            Term::List(list) => Some(list),
            Term::Sentence(sentence) => Some(sentence.as_list()),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Term::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Name of a symbol or constant, the two atoms that can head a form.
    pub fn operator_name(&self) -> Option<&str> {
        match self {
            Term::Symbol(s) => Some(&s.name),
            Term::Constant(c) => Some(c.name()),
            _ => None,
        }
    }

    /// Number of addressable children.
    ///
    /// Lists count a dotted tail as one extra element, narts count the functor
    /// plus arguments, quoted forms have one child and atoms have none.
    pub fn size(&self) -> usize {
        match self {
            Term::List(list) => list.size(),
            Term::Sentence(sentence) => sentence.as_list().size(),
            Term::Nart(nart) => nart.args().len() + 1,
            Term::Quoted(_) => 1,
            _ => 0,
        }
    }

    /// Child at `index`; 0 is the head/operator/functor position.
    pub fn child(&self, index: usize) -> Option<&Term> {
        match self {
            Term::List(list) => list.child(index),
            Term::Sentence(sentence) => sentence.as_list().child(index),
            Term::Nart(nart) => nart.child(index),
            Term::Quoted(inner) => (index == 0).then_some(inner.as_ref()),
            _ => None,
        }
    }

    /// Immediate children in path order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Term> + '_> {
        match self {
            Term::List(list) => Box::new(list.children()),
            Term::Sentence(sentence) => Box::new(sentence.as_list().children()),
            Term::Nart(nart) => Box::new(std::iter::once(nart.functor()).chain(nart.args())),
            Term::Quoted(inner) => Box::new(std::iter::once(inner.as_ref())),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Symbol(a), Term::Symbol(b)) => a == b,
            (Term::Keyword(a), Term::Keyword(b)) => a == b,
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::Number(a), Term::Number(b)) => a == b,
            (Term::Text(a), Term::Text(b)) => a == b,
            (Term::Constant(a), Term::Constant(b)) => a == b,
            (Term::Nart(a), Term::Nart(b)) => a == b,
            (Term::Quoted(a), Term::Quoted(b)) => a == b,
            (
                Term::List(_) | Term::Sentence(_),
                Term::List(_) | Term::Sentence(_),
            ) => self.as_list() == other.as_list(),
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Term::Symbol(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Term::Keyword(k) => {
                1u8.hash(state);
                k.hash(state);
            }
            Term::Variable(v) => {
                2u8.hash(state);
                v.hash(state);
            }
            Term::Number(n) => {
                3u8.hash(state);
                n.hash(state);
            }
            Term::Text(t) => {
                4u8.hash(state);
                t.hash(state);
            }
            Term::Constant(c) => {
                5u8.hash(state);
                c.hash(state);
            }
            // Lists and sentences share a tag: they are equal when their storage is.
            Term::List(list) => {
                6u8.hash(state);
                list.hash(state);
            }
            Term::Sentence(sentence) => {
                6u8.hash(state);
                sentence.as_list().hash(state);
            }
            Term::Nart(nart) => {
                7u8.hash(state);
                nart.hash(state);
            }
            Term::Quoted(inner) => {
                8u8.hash(state);
                inner.hash(state);
            }
        }
    }
}

impl From<Symbol> for Term {
    fn from(v: Symbol) -> Self {
        Term::Symbol(v)
    }
}

impl From<Keyword> for Term {
    fn from(v: Keyword) -> Self {
        Term::Keyword(v)
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

impl From<Number> for Term {
    fn from(v: Number) -> Self {
        Term::Number(v)
    }
}

impl From<Constant> for Term {
    fn from(v: Constant) -> Self {
        Term::Constant(v)
    }
}

impl From<TermList> for Term {
    fn from(v: TermList) -> Self {
        Term::List(v)
    }
}

impl From<Nart> for Term {
    fn from(v: Nart) -> Self {
        Term::Nart(v)
    }
}

impl From<Sentence> for Term {
    fn from(v: Sentence) -> Self {
        Term::Sentence(v)
    }
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Term::int(v)
    }
}

impl From<&str> for Term {
    fn from(v: &str) -> Self {
        Term::text(v)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::wire::writer::display(self))
    }
}
