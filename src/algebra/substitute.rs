//! Replacement of subterms, copying and in place.
//!
//! Replacements are not searched again: if `new` contains `old`, the copy of
//! `old` inside `new` is left alone. A NART whose functor or arguments change
//! no longer denotes its indexed term and loses its GUID.

use std::collections::HashMap;

use crate::term::{Nart, Sentence, Term, TermList};

/// A copy of `tree` with every occurrence of `old` replaced by `new`.
///
/// Subtrees without a match are cloned as they are.
pub fn substitute_non_destructive(tree: &Term, old: &Term, new: &Term) -> Term {
    let replace = |t: &Term| (t == old).then(|| new.clone());
    rewrite(tree, &replace).unwrap_or_else(|| tree.clone())
}

/// Apply every `old → new` pair of `substitution` in one pass.
///
/// Replacements happen top-down: a subtree that matches a key is replaced as
/// a whole and its interior is not visited.
pub fn tree_substitute(tree: &Term, substitution: &HashMap<Term, Term>) -> Term {
    if substitution.is_empty() {
        return tree.clone();
    }
    let replace = |t: &Term| substitution.get(t).cloned();
    rewrite(tree, &replace).unwrap_or_else(|| tree.clone())
}

/// `Some(rewritten)` if anything below `term` changed, `None` otherwise.
fn rewrite(term: &Term, replace: &dyn Fn(&Term) -> Option<Term>) -> Option<Term> {
    if let Some(replacement) = replace(term) {
        return Some(replacement);
    }
    match term {
        Term::List(list) => rewrite_list(list, replace).map(Term::List),
        Term::Sentence(sentence) => rewrite_list(sentence.as_list(), replace)
            .map(|list| Term::Sentence(Sentence::from_list(list))),
        Term::Nart(nart) => {
            let functor = rewrite(nart.functor(), replace);
            let args: Vec<Option<Term>> = nart.args().iter().map(|a| rewrite(a, replace)).collect();
            if functor.is_none() && args.iter().all(Option::is_none) {
                return None;
            }
            let functor = functor.unwrap_or_else(|| nart.functor().clone());
            let args = args
                .into_iter()
                .zip(nart.args())
                .map(|(changed, original)| changed.unwrap_or_else(|| original.clone()))
                .collect();
            Some(Term::Nart(Nart::new(functor, args)))
        }
        Term::Quoted(inner) => rewrite(inner, replace).map(Term::quote),
        _ => None,
    }
}

fn rewrite_list(list: &TermList, replace: &dyn Fn(&Term) -> Option<Term>) -> Option<TermList> {
    let elements: Vec<Option<Term>> = list.elements().iter().map(|e| rewrite(e, replace)).collect();
    let tail = list.tail().and_then(|t| rewrite(t, replace));
    if tail.is_none() && elements.iter().all(Option::is_none) {
        return None;
    }
    let elements = elements
        .into_iter()
        .zip(list.elements())
        .map(|(changed, original)| changed.unwrap_or_else(|| original.clone()))
        .collect();
    let mut rebuilt = TermList::proper(elements);
    rebuilt.set_tail(tail.or_else(|| list.tail().cloned()));
    Some(rebuilt)
}

/// Replace every occurrence of `old` with `new` in place.
///
/// Returns the number of replacements made.
pub fn substitute_destructive(tree: &mut Term, old: &Term, new: &Term) -> usize {
    if *tree == *old {
        *tree = new.clone();
        return 1;
    }
    match tree {
        Term::List(list) => substitute_in_list(list, old, new),
        Term::Sentence(sentence) => {
            let count = substitute_in_list(sentence.list_mut(), old, new);
            if count > 0 {
                sentence.rebind();
            }
            count
        }
        Term::Nart(nart) => {
            let mut count = 0;
            for index in 0..=nart.args().len() {
                if let Some(child) = nart.child_mut(index) {
                    count += substitute_destructive(child, old, new);
                }
            }
            if count > 0 {
                nart.unindex();
            }
            count
        }
        Term::Quoted(inner) => substitute_destructive(inner, old, new),
        _ => 0,
    }
}

fn substitute_in_list(list: &mut TermList, old: &Term, new: &Term) -> usize {
    let count: usize = list
        .children_mut()
        .map(|child| substitute_destructive(child, old, new))
        .sum();
    if count > 0 {
        list.normalize_tail();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::tree_contains;
    use crate::term::{Guid, LogicalOperator, Variable};

    fn sample() -> Term {
        Term::Sentence(Sentence::compose(
            LogicalOperator::And,
            vec![
                Term::list(vec![Term::symbol("isa"), Term::var("X"), Term::symbol("Dog")]),
                Term::list(vec![Term::symbol("owns"), Term::symbol("Joe"), Term::var("X")]),
                Term::quote(Term::var("X")),
            ],
        ))
    }

    #[test]
    fn non_destructive_leaves_original() {
        let tree = sample();
        let rex = Term::symbol("Rex");
        let result = substitute_non_destructive(&tree, &Term::var("X"), &rex);
        assert!(tree_contains(&tree, &Term::var("X")));
        assert!(!tree_contains(&result, &Term::var("X")));
        assert!(tree_contains(&result, &rex));
        assert!(matches!(result, Term::Sentence(_)));
    }

    #[test]
    fn non_destructive_without_match_is_equal() {
        let tree = sample();
        let result = substitute_non_destructive(&tree, &Term::symbol("Cat"), &Term::symbol("Dog"));
        assert_eq!(result, tree);
    }

    #[test]
    fn replacing_the_root() {
        let tree = Term::symbol("a");
        assert_eq!(
            substitute_non_destructive(&tree, &Term::symbol("a"), &Term::int(1)),
            Term::int(1)
        );
    }

    #[test]
    fn new_containing_old_is_not_revisited() {
        let tree = Term::list(vec![Term::symbol("f"), Term::symbol("a")]);
        let wrapped = Term::list(vec![Term::symbol("g"), Term::symbol("a")]);
        let result = substitute_non_destructive(&tree, &Term::symbol("a"), &wrapped);
        assert_eq!(
            result,
            Term::list(vec![Term::symbol("f"), wrapped.clone()])
        );
        assert!(tree_contains(&result, &Term::symbol("a")));
    }

    #[test]
    fn destructive_counts_replacements() {
        let mut tree = sample();
        let count = substitute_destructive(&mut tree, &Term::var("X"), &Term::symbol("Rex"));
        assert_eq!(count, 3);
        assert!(!tree_contains(&tree, &Term::var("X")));
    }

    #[test]
    fn destructive_and_non_destructive_agree() {
        let tree = sample();
        let copied = substitute_non_destructive(&tree, &Term::symbol("Joe"), &Term::symbol("Ann"));
        let mut edited = tree.clone();
        substitute_destructive(&mut edited, &Term::symbol("Joe"), &Term::symbol("Ann"));
        assert_eq!(copied, edited);
    }

    #[test]
    fn destructive_updates_bound_variables() {
        let mut tree = Term::Sentence(Sentence::for_all(
            Variable::new("X"),
            Term::list(vec![Term::symbol("p"), Term::var("X")]),
        ));
        substitute_destructive(&mut tree, &Term::var("X"), &Term::var("Y"));
        let Term::Sentence(sentence) = &tree else {
            panic!("sentence expected");
        };
        assert_eq!(sentence.bound_variables(), &[Variable::new("Y")]);
    }

    #[test]
    fn list_tail_replaced_by_list_is_spliced() {
        let mut tree = Term::dotted(vec![Term::symbol("a")], Term::symbol("b"));
        let replacement = Term::list(vec![Term::symbol("c"), Term::symbol("d")]);
        substitute_destructive(&mut tree, &Term::symbol("b"), &replacement);
        assert_eq!(
            tree,
            Term::list(vec![Term::symbol("a"), Term::symbol("c"), Term::symbol("d")])
        );

        let copied = substitute_non_destructive(
            &Term::dotted(vec![Term::symbol("a")], Term::symbol("b")),
            &Term::symbol("b"),
            &replacement,
        );
        assert_eq!(copied, tree);
    }

    #[test]
    fn changed_narts_lose_their_guid() {
        let mut tree = Term::Nart(Nart::indexed(
            Term::symbol("GovernmentFn"),
            vec![Term::symbol("France")],
            Guid::from_u128(3),
        ));
        substitute_destructive(&mut tree, &Term::symbol("France"), &Term::symbol("Spain"));
        let Term::Nart(nart) = &tree else {
            panic!("nart expected");
        };
        assert!(!nart.is_indexed());
        assert_eq!(nart.args(), &[Term::symbol("Spain")]);
    }

    #[test]
    fn tree_substitute_applies_all_pairs_at_once() {
        let tree = Term::list(vec![Term::symbol("likes"), Term::var("A"), Term::var("B")]);
        let map = HashMap::from([
            (Term::var("A"), Term::var("B")),
            (Term::var("B"), Term::var("A")),
        ]);
        assert_eq!(
            tree_substitute(&tree, &map),
            Term::list(vec![Term::symbol("likes"), Term::var("B"), Term::var("A")])
        );
    }

    #[test]
    fn tree_substitute_reaches_nart_arguments_and_operands() {
        let nart = Term::Nart(Nart::new(Term::symbol("CapitalFn"), vec![Term::symbol("Now")]));
        let tree = Term::Sentence(Sentence::compose(
            LogicalOperator::Not,
            vec![Term::list(vec![Term::symbol("visits"), Term::symbol("Me"), nart])],
        ));
        let map = HashMap::from([
            (Term::symbol("Now"), Term::symbol("France")),
            (Term::symbol("Me"), Term::symbol("Joe")),
        ]);
        let result = tree_substitute(&tree, &map);
        assert!(tree_contains(&result, &Term::symbol("France")));
        assert!(tree_contains(&result, &Term::symbol("Joe")));
        assert!(!tree_contains(&result, &Term::symbol("Now")));
        assert!(!tree_contains(&result, &Term::symbol("Me")));
    }
}
