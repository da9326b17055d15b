//! Proper and improper (dotted) lists.

use std::hash::{Hash, Hasher};

use super::Term;

/// An ordered sequence of terms with an optional dotted tail.
///
/// The tail, when present, is never itself a list: constructing a dotted list
/// whose tail is a list splices the tail's elements in, exactly as a Lisp
/// reader folds `(a . (b c))` into `(a b c)`.
#[derive(Debug, Clone, Default)]
pub struct TermList {
    elements: Vec<Term>,
    tail: Option<Box<Term>>,
}

impl TermList {
    /// The empty list `()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A proper list of the given elements.
    pub fn proper(elements: Vec<Term>) -> Self {
        Self {
            elements,
            tail: None,
        }
    }

    /// A list with the given elements and dotted tail, normalized so that the
    /// tail is never a list.
    pub fn dotted(elements: Vec<Term>, tail: Term) -> Self {
        let mut list = Self::proper(elements);
        list.set_tail(Some(tail));
        list
    }

    pub fn elements(&self) -> &[Term] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<Term> {
        &mut self.elements
    }

    pub fn tail(&self) -> Option<&Term> {
        self.tail.as_deref()
    }

    pub fn tail_mut(&mut self) -> Option<&mut Term> {
        self.tail.as_deref_mut()
    }

    /// Replace the dotted tail, splicing list-valued tails into the elements.
    pub fn set_tail(&mut self, tail: Option<Term>) {
        self.tail = None;
        let Some(tail) = tail else { return };
        match tail {
            Term::List(inner) => self.append_list(inner),
            Term::Sentence(sentence) => self.append_list(sentence.into_list()),
            other => self.tail = Some(Box::new(other)),
        }
    }

    fn append_list(&mut self, inner: TermList) {
        self.elements.extend(inner.elements);
        self.tail = inner.tail;
    }

    pub fn push(&mut self, term: Term) {
        self.elements.push(term);
    }

    /// First element: the operator/functor/head position.
    pub fn head(&self) -> Option<&Term> {
        self.elements.first()
    }

    /// Elements after the head.
    pub fn rest(&self) -> &[Term] {
        self.elements.get(1..).unwrap_or(&[])
    }

    pub fn is_proper(&self) -> bool {
        self.tail.is_none()
    }

    /// `()`: no elements and no tail.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.tail.is_none()
    }

    /// Number of elements, counting a dotted tail as one more.
    ///
    /// `(10 . Brazil)` has size 2.
    pub fn size(&self) -> usize {
        self.elements.len() + usize::from(self.tail.is_some())
    }

    /// Child at `index`, where the tail (if any) sits at `elements().len()`.
    pub fn child(&self, index: usize) -> Option<&Term> {
        if index < self.elements.len() {
            self.elements.get(index)
        } else if index == self.elements.len() {
            self.tail.as_deref()
        } else {
            None
        }
    }

    /// Mutable counterpart of [`TermList::child`].
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Term> {
        let len = self.elements.len();
        if index < len {
            self.elements.get_mut(index)
        } else if index == len {
            self.tail.as_deref_mut()
        } else {
            None
        }
    }

    /// All children in order: elements, then the tail.
    pub fn children(&self) -> impl Iterator<Item = &Term> {
        self.elements.iter().chain(self.tail.as_deref())
    }

    /// Mutable iterator over elements and tail.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Term> {
        self.elements.iter_mut().chain(self.tail.as_deref_mut())
    }

    /// Split into elements and tail.
    pub fn into_parts(self) -> (Vec<Term>, Option<Term>) {
        (self.elements, self.tail.map(|t| *t))
    }

    /// Restore the non-list-tail invariant after a child was replaced in place.
    pub(crate) fn normalize_tail(&mut self) {
        if matches!(self.tail.as_deref(), Some(Term::List(_) | Term::Sentence(_))) {
            let tail = self.tail.take().map(|t| *t);
            self.set_tail(tail);
        }
    }
}

impl PartialEq for TermList {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements && self.tail == other.tail
    }
}

impl Eq for TermList {}

impl Hash for TermList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state);
        self.tail.hash(state);
    }
}

impl From<Vec<Term>> for TermList {
    fn from(elements: Vec<Term>) -> Self {
        TermList::proper(elements)
    }
}

impl FromIterator<Term> for TermList {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        TermList::proper(iter.into_iter().collect())
    }
}
