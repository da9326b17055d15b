//! Path-addressed lookup and update.

use crate::error::{PathError, WireResult};
use crate::term::Term;

/// Child indices from the root; empty addresses the root itself.
pub type Path = Vec<usize>;

/// Every path at which `target` occurs in `tree`, in pre-order.
///
/// A match is not searched further. A missing target yields an empty vector.
pub fn get_arg_positions_for_term(tree: &Term, target: &Term) -> Vec<Path> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    collect_positions(tree, target, &mut path, &mut found, false);
    found
}

/// The first pre-order path at which `target` occurs.
pub fn get_first_arg_position_for_term(tree: &Term, target: &Term) -> Option<Path> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    collect_positions(tree, target, &mut path, &mut found, true);
    found.pop()
}

fn collect_positions(
    term: &Term,
    target: &Term,
    path: &mut Path,
    found: &mut Vec<Path>,
    first_only: bool,
) {
    if term == target {
        found.push(path.clone());
        return;
    }
    for (index, child) in term.children().enumerate() {
        if first_only && !found.is_empty() {
            return;
        }
        path.push(index);
        collect_positions(child, target, path, found, first_only);
        path.pop();
    }
}

/// The subterm of `tree` at `path`.
pub fn get_specified_object<'t>(tree: &'t Term, path: &[usize]) -> WireResult<&'t Term> {
    let mut node = tree;
    for (depth, &index) in path.iter().enumerate() {
        node = step(node, index, depth)?;
    }
    Ok(node)
}

fn step(node: &Term, index: usize, depth: usize) -> Result<&Term, PathError> {
    if node.is_atom() {
        return Err(PathError::NotComposite { depth });
    }
    node.child(index).ok_or(PathError::OutOfRange {
        index,
        depth,
        size: node.size(),
    })
}

/// Replace the subterm at `path` with `value`, returning the old subterm.
///
/// Sentences along the path have their bound variables recomputed, and a
/// list-valued dotted tail is spliced into its list. The tree is unchanged
/// when the path does not resolve.
pub fn set_specified_object(tree: &mut Term, path: &[usize], value: Term) -> WireResult<Term> {
    set_at(tree, path, 0, value).map_err(Into::into)
}

fn set_at(node: &mut Term, path: &[usize], depth: usize, value: Term) -> Result<Term, PathError> {
    let Some((&index, rest)) = path.split_first() else {
        return Ok(std::mem::replace(node, value));
    };
    let size = node.size();
    let out_of_range = PathError::OutOfRange { index, depth, size };
    let old = match node {
        Term::List(list) => {
            let child = list.child_mut(index).ok_or(out_of_range)?;
            let old = set_at(child, rest, depth + 1, value)?;
            list.normalize_tail();
            old
        }
        Term::Sentence(sentence) => {
            let list = sentence.list_mut();
            let child = list.child_mut(index).ok_or(out_of_range)?;
            let old = set_at(child, rest, depth + 1, value)?;
            list.normalize_tail();
            sentence.rebind();
            old
        }
        Term::Nart(nart) => {
            let child = nart.child_mut(index).ok_or(out_of_range)?;
            let old = set_at(child, rest, depth + 1, value)?;
            nart.unindex();
            old
        }
        Term::Quoted(inner) if index == 0 => set_at(inner, rest, depth + 1, value)?,
        Term::Quoted(_) => return Err(out_of_range),
        _ => return Err(PathError::NotComposite { depth }),
    };
    Ok(old)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;
    use crate::term::{Nart, Sentence, Variable};

    fn sample() -> Term {
        // (and (isa ?X Dog) (owns Joe ?X))
        Term::list(vec![
            Term::symbol("and"),
            Term::list(vec![Term::symbol("isa"), Term::var("X"), Term::symbol("Dog")]),
            Term::list(vec![Term::symbol("owns"), Term::symbol("Joe"), Term::var("X")]),
        ])
    }

    #[test]
    fn positions_are_found_in_pre_order() {
        let paths = get_arg_positions_for_term(&sample(), &Term::var("X"));
        assert_eq!(paths, vec![vec![1, 1], vec![2, 2]]);
        assert_eq!(
            get_first_arg_position_for_term(&sample(), &Term::var("X")),
            Some(vec![1, 1])
        );
    }

    #[test]
    fn head_position_is_zero() {
        assert_eq!(
            get_first_arg_position_for_term(&sample(), &Term::symbol("owns")),
            Some(vec![2, 0])
        );
    }

    #[test]
    fn root_match_is_the_empty_path() {
        let tree = sample();
        assert_eq!(get_arg_positions_for_term(&tree, &tree), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn missing_target_gives_empty_results() {
        assert!(get_arg_positions_for_term(&sample(), &Term::symbol("Cat")).is_empty());
        assert_eq!(get_first_arg_position_for_term(&sample(), &Term::symbol("Cat")), None);
    }

    #[test]
    fn get_follows_paths() {
        let tree = sample();
        assert_eq!(get_specified_object(&tree, &[2, 1]).unwrap(), &Term::symbol("Joe"));
        assert_eq!(get_specified_object(&tree, &[]).unwrap(), &tree);
    }

    #[test]
    fn get_out_of_range_fails() {
        let err = get_specified_object(&sample(), &[1, 3]).unwrap_err();
        assert!(matches!(
            err,
            WireError::Path(PathError::OutOfRange {
                index: 3,
                depth: 1,
                size: 3
            })
        ));
    }

    #[test]
    fn get_into_atom_fails() {
        let err = get_specified_object(&sample(), &[1, 2, 0]).unwrap_err();
        assert!(matches!(err, WireError::Path(PathError::NotComposite { depth: 2 })));
    }

    #[test]
    fn dotted_tail_is_addressable() {
        let pair = Term::dotted(vec![Term::int(10)], Term::symbol("Brazil"));
        assert_eq!(get_specified_object(&pair, &[1]).unwrap(), &Term::symbol("Brazil"));
        assert_eq!(get_arg_positions_for_term(&pair, &Term::symbol("Brazil")), vec![vec![1]]);
    }

    #[test]
    fn nart_and_quote_children() {
        let nart = Term::Nart(Nart::new(Term::symbol("CapitalFn"), vec![Term::symbol("France")]));
        let tree = Term::quote(Term::list(vec![Term::symbol("p"), nart]));
        assert_eq!(
            get_first_arg_position_for_term(&tree, &Term::symbol("France")),
            Some(vec![0, 1, 1])
        );
        assert_eq!(
            get_specified_object(&tree, &[0, 1, 0]).unwrap(),
            &Term::symbol("CapitalFn")
        );
    }

    #[test]
    fn set_replaces_and_returns_old() {
        let mut tree = sample();
        let old = set_specified_object(&mut tree, &[1, 2], Term::symbol("Cat")).unwrap();
        assert_eq!(old, Term::symbol("Dog"));
        assert_eq!(get_specified_object(&tree, &[1, 2]).unwrap(), &Term::symbol("Cat"));
    }

    #[test]
    fn set_with_bad_path_leaves_tree_unchanged() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(set_specified_object(&mut tree, &[5], Term::int(0)).is_err());
        assert!(set_specified_object(&mut tree, &[1, 0, 0], Term::int(0)).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn set_root_replaces_everything() {
        let mut tree = sample();
        set_specified_object(&mut tree, &[], Term::symbol("done")).unwrap();
        assert_eq!(tree, Term::symbol("done"));
    }

    #[test]
    fn set_in_binding_slot_rebinds() {
        let mut tree = Term::Sentence(Sentence::for_all(
            Variable::new("X"),
            Term::list(vec![Term::symbol("p"), Term::var("X")]),
        ));
        set_specified_object(&mut tree, &[1], Term::var("Y")).unwrap();
        let Term::Sentence(sentence) = &tree else {
            panic!("sentence expected");
        };
        assert_eq!(sentence.bound_variables(), &[Variable::new("Y")]);
    }
}
