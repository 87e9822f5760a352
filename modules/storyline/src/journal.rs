//! In-memory log of applied actions.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who dispatched an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Driver,
    Storyline,
}

/// An action the store accepted, with its position in the run.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedAction<A> {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub origin: Origin,
    pub action: A,
}

/// Append-only. Sequence numbers start at 1.
pub(crate) struct Journal<A> {
    next_seq: u64,
    entries: Vec<AppliedAction<A>>,
}

impl<A: Clone> Journal<A> {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, origin: Origin, action: A) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(AppliedAction {
            seq,
            at: Utc::now(),
            origin,
            action,
        });
        seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> Vec<AppliedAction<A>> {
        self.entries.clone()
    }
}
