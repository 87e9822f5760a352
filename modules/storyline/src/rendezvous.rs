//! The "blocked" rendezvous that decides when a driver call settles.
//!
//! Suspension points raise `blocked`; fulfilling a registration or an effect
//! raises `woken`. Both are one-shot: the engine clears them before every poll
//! of the storyline and reads them once after it.

use std::cell::Cell;

/// What the engine does after the storyline returned `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// A resolution landed during the poll; poll again.
    Continue,
    /// Parked on the engine. The driver call settles.
    Quiescent,
    /// Waiting on something outside the engine; wait for the waker.
    External,
}

#[derive(Debug, Default)]
pub(crate) struct Rendezvous {
    blocked: Cell<bool>,
    woken: Cell<bool>,
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise_blocked(&self) {
        self.blocked.set(true);
    }

    pub fn raise_woken(&self) {
        self.woken.set(true);
    }

    pub fn arm(&self) {
        self.blocked.set(false);
        self.woken.set(false);
    }

    /// `parked` is whether a wait registration or pending effect is live.
    pub fn verdict(&self, parked: bool) -> Verdict {
        let woken = self.woken.replace(false);
        let blocked = self.blocked.replace(false);
        if woken {
            Verdict::Continue
        } else if blocked || parked {
            Verdict::Quiescent
        } else {
            Verdict::External
        }
    }
}
