//! Handler registration and results.

use std::fmt;

use async_trait::async_trait;

use crate::{Fact, FactSet, Guard};

/// Result of running a handler body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The work is done; the handler's produced facts are set.
    Complete,

    /// Preconditions outside the fact set are not met yet. Nothing is set and
    /// the handler runs again on a later pass.
    Waiting(String),

    /// A side effect failed. Nothing is set and the handler runs again, from
    /// scratch, on a later pass.
    Blocked(String),
}

impl Outcome {
    /// Returns whether the outcome is [`Outcome::Complete`].
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Returns whether the outcome is [`Outcome::Blocked`].
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// Returns whether the outcome is [`Outcome::Waiting`].
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Waiting(reason) => write!(f, "waiting: {reason}"),
            Self::Blocked(reason) => write!(f, "blocked: {reason}"),
        }
    }
}

/// A unit of convergence work.
///
/// Bodies must be idempotent: a blocked or waiting handler is re-run from
/// scratch whenever its guard matches again.
#[async_trait]
pub trait Handler<C>: Send + Sync + 'static
where
    C: Send + 'static,
{
    /// Runs the handler body.
    ///
    /// The handler may set or clear facts other than the ones it produces
    /// through `facts`. Facts cleared here invalidate their dependents once
    /// the handler returns.
    async fn run(&self, context: &mut C, facts: &mut FactSet) -> Outcome;
}

/// Declaration of a handler: its name, guard, and produced facts.
#[derive(Clone, Debug)]
pub struct HandlerSpec {
    name: &'static str,
    guard: Guard,
    produces: Vec<Fact>,
    latched: bool,
}

impl HandlerSpec {
    /// Creates a handler declaration with an always-matching guard.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            guard: Guard::new(),
            produces: Vec::new(),
            latched: false,
        }
    }

    /// Adds a fact that must be set for the handler to run.
    #[must_use]
    pub fn requires(mut self, fact: Fact) -> Self {
        self.guard = self.guard.requires(fact);
        self
    }

    /// Adds a fact that must be unset for the handler to run.
    #[must_use]
    pub fn forbids(mut self, fact: Fact) -> Self {
        self.guard = self.guard.forbids(fact);
        self
    }

    /// Adds a fact set when the handler completes.
    #[must_use]
    pub fn produces(mut self, fact: Fact) -> Self {
        if !self.produces.contains(&fact) {
            self.produces.push(fact);
        }
        self
    }

    /// Keeps the produced facts when a required fact is later cleared.
    ///
    /// Used for one-shot work such as a first start, whose result stays true
    /// even if the condition that triggered it goes away.
    #[must_use]
    pub const fn latched(mut self) -> Self {
        self.latched = true;
        self
    }

    /// The handler name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The handler guard.
    #[must_use]
    pub const fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Facts set when the handler completes.
    #[must_use]
    pub fn produced(&self) -> &[Fact] {
        &self.produces
    }

    /// Whether produced facts survive invalidation of required facts.
    #[must_use]
    pub const fn is_latched(&self) -> bool {
        self.latched
    }
}
