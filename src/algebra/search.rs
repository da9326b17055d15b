//! Membership tests and typed collection over term trees.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::term::{
    Constant, Keyword, Nart, Number, Sentence, Symbol, Term, TermKind, TermList, Variable,
};

/// Whether `target` is `tree` itself or one of its immediate children.
///
/// Only one level is inspected; use [`tree_contains`] for a full descent.
pub fn contains(tree: &Term, target: &Term) -> bool {
    tree == target || tree.children().any(|child| child == target)
}

/// Whether `target` occurs anywhere in `tree`, operators and functors included.
pub fn tree_contains(tree: &Term, target: &Term) -> bool {
    tree == target || tree.children().any(|child| tree_contains(child, target))
}

/// A term variant that [`tree_gather`] can collect.
pub trait Gatherable: Clone + Eq + Hash {
    fn from_term(term: &Term) -> Option<&Self>;
}

impl Gatherable for Variable {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }
}

impl Gatherable for Constant {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Constant(c) => Some(c),
            _ => None,
        }
    }
}

impl Gatherable for Symbol {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl Gatherable for Keyword {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Keyword(k) => Some(k),
            _ => None,
        }
    }
}

impl Gatherable for Nart {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Nart(n) => Some(n),
            _ => None,
        }
    }
}

impl Gatherable for Number {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Number(n) => Some(n),
            _ => None,
        }
    }
}

impl Gatherable for Sentence {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Sentence(s) => Some(s),
            _ => None,
        }
    }
}

impl Gatherable for TermList {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::List(l) => Some(l),
            _ => None,
        }
    }
}

/// String literals.
impl Gatherable for String {
    fn from_term(term: &Term) -> Option<&Self> {
        match term {
            Term::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Every subterm of variant `T`, deduplicated, in pre-order of first occurrence.
///
/// ```
/// use kbwire::algebra::tree_gather;
/// use kbwire::term::{Term, Variable};
///
/// let t = Term::list(vec![Term::symbol("p"), Term::var("X"), Term::var("X")]);
/// let vars = tree_gather::<Variable>(&t);
/// assert_eq!(vars.len(), 1);
/// ```
pub fn tree_gather<T: Gatherable>(tree: &Term) -> IndexSet<T> {
    let mut found = IndexSet::new();
    gather_into(tree, &mut found);
    found
}

/// Every subterm of the given kind, as whole terms, deduplicated, in pre-order
/// of first occurrence. Covers kinds without a [`Gatherable`] type, such as
/// quoted forms.
pub fn tree_gather_kind(tree: &Term, kind: TermKind) -> IndexSet<Term> {
    let mut found = IndexSet::new();
    gather_kind_into(tree, kind, &mut found);
    found
}

fn gather_kind_into(term: &Term, kind: TermKind, found: &mut IndexSet<Term>) {
    if term.kind() == kind && !found.contains(term) {
        found.insert(term.clone());
    }
    for child in term.children() {
        gather_kind_into(child, kind, found);
    }
}

fn gather_into<T: Gatherable>(term: &Term, found: &mut IndexSet<T>) {
    if let Some(item) = T::from_term(term) {
        if !found.contains(item) {
            found.insert(item.clone());
        }
    }
    for child in term.children() {
        gather_into(child, found);
    }
}
