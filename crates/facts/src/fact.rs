//! Named boolean facts and the set that holds them.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// A named boolean readiness or completion signal.
///
/// Facts compare by name, so a fact built at runtime with [`Fact::new`] equals
/// a `const` fact built with [`Fact::from_static`] when the names match.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fact(Cow<'static, str>);

impl Fact {
    /// Creates a fact from a static name. Usable in `const` context.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a fact from an owned name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the name of the fact.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Fact {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// The set of currently established facts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactSet {
    facts: BTreeSet<Fact>,
}

impl FactSet {
    /// Creates an empty fact set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a fact. Returns `true` if it was not set before.
    pub fn set(&mut self, fact: Fact) -> bool {
        self.facts.insert(fact)
    }

    /// Clears a fact. Returns `true` if it was set before.
    ///
    /// This does not invalidate facts that depend on it; use
    /// [`Engine::clear_fact`](crate::Engine::clear_fact) for that.
    pub fn clear(&mut self, fact: &Fact) -> bool {
        self.facts.remove(fact)
    }

    /// Returns whether a fact is set.
    #[must_use]
    pub fn is_set(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Returns the number of set facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns whether no fact is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates over set facts in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Facts set in `self` but not in `other`.
    pub(crate) fn difference<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a Fact> {
        self.facts.difference(&other.facts)
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().collect(),
        }
    }
}

impl Extend<Fact> for FactSet {
    fn extend<I: IntoIterator<Item = Fact>>(&mut self, iter: I) {
        self.facts.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const READY: Fact = Fact::from_static("svc.ready");

    #[test]
    fn test_static_and_owned_facts_are_equal() {
        let owned = Fact::new(String::from("svc.ready"));

        assert_eq!(READY, owned);

        let mut facts = FactSet::new();
        facts.set(owned);
        assert!(facts.is_set(&READY));
    }

    #[test]
    fn test_set_and_clear_report_changes() {
        let mut facts = FactSet::new();

        assert!(facts.set(READY));
        assert!(!facts.set(READY));
        assert!(facts.clear(&READY));
        assert!(!facts.clear(&READY));
        assert!(facts.is_empty());
    }
}
