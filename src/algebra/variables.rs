//! Free-variable analysis.

use indexmap::IndexSet;

use crate::term::sentence::binding_slot_variables;
use crate::term::{Term, Variable};

/// Variables of `tree` not bound by an enclosing quantifier within `tree`.
///
/// A quantified form binds the variable (or list of variables) in its binding
/// slot for all of its operands, nested forms included. Quantifier lists that
/// were never promoted to sentences bind the same way. Result order is the
/// pre-order of first free occurrence.
pub fn find_free_variables(tree: &Term) -> IndexSet<Variable> {
    let mut bound = Vec::new();
    let mut free = IndexSet::new();
    collect_free(tree, &mut bound, &mut free);
    free
}

fn collect_free(term: &Term, bound: &mut Vec<Variable>, free: &mut IndexSet<Variable>) {
    if let Term::Variable(v) = term {
        if !bound.contains(v) && !free.contains(v) {
            free.insert(v.clone());
        }
        return;
    }
    let introduced = match term {
        Term::Sentence(sentence) => sentence.bound_variables().to_vec(),
        Term::List(list) => binding_slot_variables(list),
        _ => Vec::new(),
    };
    let depth = bound.len();
    bound.extend(introduced);
    for child in term.children() {
        collect_free(child, bound, free);
    }
    bound.truncate(depth);
}
