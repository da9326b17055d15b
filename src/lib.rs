// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # kbwire
//!
//! Term model and wire codec for a remote knowledge-base inference engine.
//!
//! Requests and replies travel as Lisp-like text. This crate turns that text
//! into a typed [`Term`](term::Term) tree and back, and provides the pieces a
//! client needs around it.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): closed enum of atoms, lists, sentences and reified terms
//! - **Registry** (`registry`): process-wide interning of constants and NARTs
//! - **Wire** (`wire`): tokenizer, reader, writer and the reifiability oracle seam
//! - **Algebra** (`algebra`): searches, substitution and path addressing over trees
//! - **Cache** (`cache`): bounded LRU caches for repeated remote queries
//! - **Config** (`config`): TOML configuration for all of the above
//!
//! ## Library usage
//!
//! ```
//! use kbwire::registry::ConstantRegistry;
//! use kbwire::term::Guid;
//! use kbwire::wire::{Reader, Writer};
//!
//! let registry = ConstantRegistry::new();
//! registry.intern("Brazil", Guid::from_u128(1)).unwrap();
//!
//! let term = Reader::new(&registry).read("(10 . Brazil)").unwrap();
//! assert_eq!(term.size(), 2);
//! assert_eq!(Writer::default().write(&term).unwrap(), "(10 . Brazil)");
//! ```

pub mod algebra;
pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod term;
pub mod wire;

pub use error::{WireError, WireResult};
pub use term::Term;
pub use wire::{read, write};
