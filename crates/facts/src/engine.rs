//! The reconciliation engine.

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use crate::{Fact, FactSet, Handler, HandlerSpec, Outcome};

struct Registration<C>
where
    C: Send + 'static,
{
    spec: HandlerSpec,
    handler: Box<dyn Handler<C>>,
}

/// Handlers that ran during one pass, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    executed: Vec<(&'static str, Outcome)>,
}

impl PassReport {
    /// Handlers that ran, with their outcomes, in execution order.
    #[must_use]
    pub fn executed(&self) -> &[(&'static str, Outcome)] {
        &self.executed
    }

    /// Names of the handlers that ran, in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.executed.iter().map(|(name, _)| *name).collect()
    }

    /// Returns whether the named handler ran.
    #[must_use]
    pub fn ran(&self, name: &str) -> bool {
        self.executed.iter().any(|(ran, _)| *ran == name)
    }

    /// The outcome of the named handler, if it ran.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.executed
            .iter()
            .find(|(ran, _)| *ran == name)
            .map(|(_, outcome)| outcome)
    }

    /// Returns whether no handler ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executed.is_empty()
    }

    /// Returns whether any handler reported [`Outcome::Blocked`].
    #[must_use]
    pub fn any_blocked(&self) -> bool {
        self.executed.iter().any(|(_, outcome)| outcome.is_blocked())
    }
}

/// Holds the fact set and the ordered handler registry.
///
/// Handlers run one at a time, in declaration order. There is no retry: a
/// handler that does not complete runs again on the next pass whose facts
/// match its guard.
pub struct Engine<C>
where
    C: Send + 'static,
{
    facts: FactSet,
    handlers: Vec<Registration<C>>,
}

impl<C> Default for Engine<C>
where
    C: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Engine<C>
where
    C: Send + 'static,
{
    /// Creates an engine with no facts and no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            facts: FactSet::new(),
            handlers: Vec::new(),
        }
    }

    /// Registers a handler after all previously registered ones.
    ///
    /// # Panics
    ///
    /// Panics if a handler with the same name is already registered.
    pub fn register<H>(&mut self, spec: HandlerSpec, handler: H)
    where
        H: Handler<C>,
    {
        assert!(
            !self.handlers.iter().any(|r| r.spec.name() == spec.name()),
            "handler {} registered twice",
            spec.name()
        );

        self.handlers.push(Registration {
            spec,
            handler: Box::new(handler),
        });
    }

    /// Current facts.
    #[must_use]
    pub const fn facts(&self) -> &FactSet {
        &self.facts
    }

    /// Returns whether a fact is set.
    #[must_use]
    pub fn is_set(&self, fact: &Fact) -> bool {
        self.facts.is_set(fact)
    }

    /// Sets a fact. Returns `true` if it was not set before.
    pub fn set_fact(&mut self, fact: Fact) -> bool {
        let changed = self.facts.set(fact.clone());
        if changed {
            debug!(%fact, "fact set");
        }
        changed
    }

    /// Clears a fact and every fact produced from it.
    ///
    /// For each handler that requires a cleared fact, the facts that handler
    /// produces are cleared too (unless the handler is latched), transitively.
    /// Returns every fact that was cleared, starting with `fact` if it was set.
    pub fn clear_fact(&mut self, fact: &Fact) -> Vec<Fact> {
        if !self.facts.clear(fact) {
            return Vec::new();
        }

        debug!(%fact, "fact cleared");
        let mut cleared = vec![fact.clone()];
        cleared.extend(self.invalidate_dependents(vec![fact.clone()]));
        cleared
    }

    /// Names of registered handlers, in declaration order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|r| r.spec.name()).collect()
    }

    /// Declaration of the named handler.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers
            .iter()
            .map(|r| &r.spec)
            .find(|spec| spec.name() == name)
    }

    /// Names of handlers whose guard matches the current facts, in declaration
    /// order.
    #[must_use]
    pub fn eligible(&self) -> Vec<&'static str> {
        self.handlers
            .iter()
            .filter(|r| r.spec.guard().matches(&self.facts))
            .map(|r| r.spec.name())
            .collect()
    }

    /// Runs one pass over the registry.
    ///
    /// Each guard is checked when its handler is reached, so facts set by an
    /// earlier handler in the same pass can enable a later one. Handlers
    /// earlier in the order are not revisited within the pass.
    pub async fn run_pass(&mut self, context: &mut C) -> PassReport {
        let mut report = PassReport::default();

        for index in 0..self.handlers.len() {
            let name = self.handlers[index].spec.name();
            if !self.handlers[index].spec.guard().matches(&self.facts) {
                trace!(handler = name, "guard does not match");
                continue;
            }

            debug!(handler = name, "running handler");
            let before = self.facts.clone();
            let outcome = self.handlers[index]
                .handler
                .run(context, &mut self.facts)
                .await;

            let cleared: Vec<Fact> = before.difference(&self.facts).cloned().collect();
            if !cleared.is_empty() {
                self.invalidate_dependents(cleared);
            }

            match &outcome {
                Outcome::Complete => {
                    for fact in self.handlers[index].spec.produced().to_vec() {
                        self.set_fact(fact);
                    }
                    info!(handler = name, "handler complete");
                }
                Outcome::Waiting(reason) => info!(handler = name, %reason, "handler waiting"),
                Outcome::Blocked(reason) => warn!(handler = name, %reason, "handler blocked"),
            }

            report.executed.push((name, outcome));
        }

        report
    }

    /// Runs passes until one leaves the facts unchanged, at most `max_passes`.
    ///
    /// Returns the report of every pass that ran.
    pub async fn run_until_quiescent(&mut self, context: &mut C, max_passes: usize) -> Vec<PassReport> {
        let mut reports = Vec::new();

        for _ in 0..max_passes {
            let before = self.facts.clone();
            let report = self.run_pass(context).await;
            let quiet = report.is_empty() || before == self.facts;
            reports.push(report);

            if quiet {
                break;
            }
        }

        reports
    }

    fn invalidate_dependents(&mut self, cleared: Vec<Fact>) -> Vec<Fact> {
        let mut queue: VecDeque<Fact> = cleared.into();
        let mut invalidated = Vec::new();

        while let Some(fact) = queue.pop_front() {
            for registration in &self.handlers {
                let spec = &registration.spec;
                if spec.is_latched() || !spec.guard().required().contains(&fact) {
                    continue;
                }

                for produced in spec.produced() {
                    if self.facts.clear(produced) {
                        debug!(
                            fact = %produced,
                            cause = %fact,
                            handler = spec.name(),
                            "fact invalidated"
                        );
                        invalidated.push(produced.clone());
                        queue.push_back(produced.clone());
                    }
                }
            }
        }

        invalidated
    }
}
