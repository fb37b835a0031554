//! Preconditions attached to a handler.

use std::collections::BTreeSet;

use crate::{Fact, FactSet};

/// Facts that must be set and facts that must be unset for a handler to run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Guard {
    requires: BTreeSet<Fact>,
    forbids: BTreeSet<Fact>,
}

impl Guard {
    /// Creates a guard that always matches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact that must be set.
    #[must_use]
    pub fn requires(mut self, fact: Fact) -> Self {
        self.requires.insert(fact);
        self
    }

    /// Adds a fact that must be unset.
    #[must_use]
    pub fn forbids(mut self, fact: Fact) -> Self {
        self.forbids.insert(fact);
        self
    }

    /// Facts that must be set.
    #[must_use]
    pub const fn required(&self) -> &BTreeSet<Fact> {
        &self.requires
    }

    /// Facts that must be unset.
    #[must_use]
    pub const fn forbidden(&self) -> &BTreeSet<Fact> {
        &self.forbids
    }

    /// Returns whether the guard holds for the given facts.
    #[must_use]
    pub fn matches(&self, facts: &FactSet) -> bool {
        self.requires.iter().all(|fact| facts.is_set(fact))
            && !self.forbids.iter().any(|fact| facts.is_set(fact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Fact = Fact::from_static("a");
    const B: Fact = Fact::from_static("b");

    #[test]
    fn test_empty_guard_always_matches() {
        assert!(Guard::new().matches(&FactSet::new()));
        assert!(Guard::new().matches(&[A, B].into_iter().collect()));
    }

    #[test]
    fn test_requires_and_forbids() {
        let guard = Guard::new().requires(A).forbids(B);

        assert!(!guard.matches(&FactSet::new()));
        assert!(guard.matches(&[A].into_iter().collect()));
        assert!(!guard.matches(&[A, B].into_iter().collect()));
        assert!(!guard.matches(&[B].into_iter().collect()));
    }

    #[test]
    fn test_contradictory_guard_never_matches() {
        let guard = Guard::new().requires(A).forbids(A);

        assert!(!guard.matches(&FactSet::new()));
        assert!(!guard.matches(&[A].into_iter().collect()));
    }
}
