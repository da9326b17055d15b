//! Reifiability oracle: decides whether a functor builds reified terms.
//!
//! Whether `(GovernmentFn France)` is a NART or an ordinary list depends on
//! what the knowledge base knows about `GovernmentFn`. The reader asks an
//! injected [`ReifiabilityOracle`] instead of reaching into live KB state, so
//! the codec can be exercised without a backing store.

use std::collections::HashSet;

use crate::error::OracleError;
use crate::term::Term;

/// Answers "is this functor reifiable?" for the reader.
pub trait ReifiabilityOracle: Send + Sync {
    /// Whether forms headed by `functor` denote reified terms.
    ///
    /// An error fails the read of the enclosing form; the reader never guesses.
    fn is_reifiable(&self, functor: &Term) -> Result<bool, OracleError>;
}

impl<F> ReifiabilityOracle for F
where
    F: Fn(&Term) -> Result<bool, OracleError> + Send + Sync,
{
    fn is_reifiable(&self, functor: &Term) -> Result<bool, OracleError> {
        self(functor)
    }
}

/// Treats every form as a plain list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverReifiable;

impl ReifiabilityOracle for NeverReifiable {
    fn is_reifiable(&self, _functor: &Term) -> Result<bool, OracleError> {
        Ok(false)
    }
}

/// A fixed set of reifiable function names, typically fetched once from the
/// knowledge base at session start.
#[derive(Debug, Clone, Default)]
pub struct NamedFunctions {
    names: HashSet<String>,
}

impl NamedFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for NamedFunctions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl ReifiabilityOracle for NamedFunctions {
    fn is_reifiable(&self, functor: &Term) -> Result<bool, OracleError> {
        Ok(functor
            .operator_name()
            .is_some_and(|name| self.names.contains(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_functions_match_symbols_and_constants() {
        let oracle: NamedFunctions = ["GovernmentFn"].into_iter().collect();
        assert!(oracle.is_reifiable(&Term::symbol("GovernmentFn")).unwrap());
        assert!(!oracle.is_reifiable(&Term::symbol("isa")).unwrap());
        assert!(!oracle.is_reifiable(&Term::int(1)).unwrap());
    }

    #[test]
    fn closures_are_oracles() {
        let oracle = |t: &Term| -> Result<bool, OracleError> {
            Ok(t.operator_name().is_some_and(|n| n.ends_with("Fn")))
        };
        assert!(oracle.is_reifiable(&Term::symbol("CapitalFn")).unwrap());
        assert!(!oracle.is_reifiable(&Term::symbol("capital")).unwrap());
    }

    #[test]
    fn never_reifiable_says_no() {
        assert!(!NeverReifiable.is_reifiable(&Term::symbol("AnyFn")).unwrap());
    }
}
