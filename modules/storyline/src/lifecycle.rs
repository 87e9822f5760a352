//! Storyline lifecycle.

use std::fmt;
use std::sync::Arc;

/// What a suspended storyline is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendedOn {
    /// A wait registration is live.
    Action,
    /// No registration, but effects are pending.
    Effect,
    /// Something outside the engine (a timer, another channel).
    External,
}

/// How the storyline ended.
#[derive(Clone)]
pub enum Outcome {
    Completed,
    Failed(Arc<anyhow::Error>),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("Completed"),
            Outcome::Failed(err) => write!(f, "Failed({err:#})"),
        }
    }
}

/// `NotStarted -> Running -> Suspended -> Running -> ... -> Done`.
#[derive(Debug, Clone)]
pub enum Phase {
    NotStarted,
    Running,
    Suspended(SuspendedOn),
    Done(Outcome),
}

impl Phase {
    pub fn is_done(&self) -> bool {
        matches!(self, Phase::Done(_))
    }

    /// Apply a transition. `Done` is terminal; anything after it is ignored.
    pub(crate) fn advance(&mut self, next: Phase) {
        if !self.is_done() {
            *self = next;
        }
    }
}
