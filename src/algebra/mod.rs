//! Tree algebra: searches, substitution and path addressing over [`Term`] trees.
//!
//! Everything here is a pure function of its arguments except
//! [`substitute_destructive`] and [`set_specified_object`], which take the
//! tree by `&mut` and edit it in place.
//!
//! A [`Path`] is a sequence of child indices. Index 0 is the head of a list
//! or sentence and the functor of a NART; a dotted tail sits at index
//! `elements.len()`; the form inside a quote is index 0. The empty path
//! addresses the root.

pub mod path;
pub mod search;
pub mod substitute;
pub mod variables;

pub use path::{
    Path, get_arg_positions_for_term, get_first_arg_position_for_term, get_specified_object,
    set_specified_object,
};
pub use search::{Gatherable, contains, tree_contains, tree_gather, tree_gather_kind};
pub use substitute::{substitute_destructive, substitute_non_destructive, tree_substitute};
pub use variables::find_free_variables;
