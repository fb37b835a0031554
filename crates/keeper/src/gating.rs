//! Decides whether membership convergence may start or restart the service.

use std::cmp::Ordering;

use crate::GatingPolicy;

/// Decision for one convergence attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Start or restart now.
    Proceed,

    /// Fewer members are known than expected.
    Wait {
        /// Members still missing.
        deficit: usize,
    },

    /// More members are known than expected.
    Excess {
        /// Members over the expected total.
        surplus: usize,
    },
}

/// Evaluates the gate for a peer set of `current` members (this node
/// included) against `expected` peers (this node excluded).
///
/// Only [`GatingPolicy::QuorumComplete`] gates; without an expected count
/// there is nothing to wait for.
#[must_use]
pub fn evaluate(policy: GatingPolicy, expected: Option<u32>, current: usize) -> Gate {
    let (GatingPolicy::QuorumComplete, Some(expected)) = (policy, expected) else {
        return Gate::Proceed;
    };

    let required = expected as usize + 1;

    match current.cmp(&required) {
        Ordering::Equal => Gate::Proceed,
        Ordering::Less => Gate::Wait {
            deficit: required - current,
        },
        Ordering::Greater => Gate::Excess {
            surplus: current - required,
        },
    }
}
