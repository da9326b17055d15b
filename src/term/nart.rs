//! Non-Atomic Reified Terms (NARTs): function applications as first-class terms.
//!
//! `(GovernmentFn France)` denotes an individual, not a truth value. On the
//! wire it is an ordinary list; in the model it is a [`Nart`] so callers can
//! tell it apart from a sentence.
//!
//! A NART is either **indexed** (the knowledge base gave it a GUID and the
//! [`ConstantRegistry`](crate::registry::ConstantRegistry) holds its canonical
//! form) or **unindexed** (identity is the functor + arguments structure).

use std::hash::{Hash, Hasher};

use super::{Guid, Term, TermList};

/// A reified function application.
#[derive(Debug, Clone)]
pub struct Nart {
    functor: Box<Term>,
    args: Vec<Term>,
    guid: Option<Guid>,
}

/// Structural identity of a NART, used for deduplication in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NartKey {
    pub(crate) functor: Term,
    pub(crate) args: Vec<Term>,
}

impl Nart {
    /// An unindexed NART.
    pub fn new(functor: Term, args: Vec<Term>) -> Self {
        Self {
            functor: Box::new(functor),
            args,
            guid: None,
        }
    }

    /// An indexed NART carrying the knowledge base's GUID.
    pub fn indexed(functor: Term, args: Vec<Term>, guid: Guid) -> Self {
        Self {
            functor: Box::new(functor),
            args,
            guid: Some(guid),
        }
    }

    pub fn functor(&self) -> &Term {
        &self.functor
    }

    pub fn functor_mut(&mut self) -> &mut Term {
        &mut self.functor
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Vec<Term> {
        &mut self.args
    }

    pub fn guid(&self) -> Option<Guid> {
        self.guid
    }

    pub fn is_indexed(&self) -> bool {
        self.guid.is_some()
    }

    /// Drop the GUID, e.g. after the structure was rewritten and no longer
    /// names the indexed individual.
    pub fn unindex(&mut self) {
        self.guid = None;
    }

    /// Child at `index`: 0 is the functor, `i` is argument `i - 1`.
    pub fn child(&self, index: usize) -> Option<&Term> {
        match index {
            0 => Some(self.functor.as_ref()),
            i => self.args.get(i - 1),
        }
    }

    /// Mutable counterpart of [`Nart::child`].
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Term> {
        match index {
            0 => Some(self.functor.as_mut()),
            i => self.args.get_mut(i - 1),
        }
    }

    /// Same term as a plain list, functor first.
    pub fn to_list(&self) -> TermList {
        std::iter::once(self.functor().clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Whether `other` has the same functor and arguments, ignoring GUIDs.
    pub fn same_structure(&self, other: &Nart) -> bool {
        self.functor == other.functor && self.args == other.args
    }

    pub(crate) fn key(&self) -> NartKey {
        NartKey {
            functor: self.functor().clone(),
            args: self.args.clone(),
        }
    }
}

impl PartialEq for Nart {
    fn eq(&self, other: &Self) -> bool {
        match (self.guid, other.guid) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.same_structure(other),
            _ => false,
        }
    }
}

impl Eq for Nart {}

impl Hash for Nart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.guid {
            Some(guid) => {
                0u8.hash(state);
                guid.hash(state);
            }
            None => {
                1u8.hash(state);
                self.functor.hash(state);
                self.args.hash(state);
            }
        }
    }
}
