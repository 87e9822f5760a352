//! Single-slot wait register.

use futures::channel::oneshot;

use crate::action::{Action, Predicate};

struct Registration<A> {
    predicate: Predicate<A>,
    resolve: oneshot::Sender<A>,
}

impl<A> Registration<A> {
    fn is_live(&self) -> bool {
        !self.resolve.is_canceled()
    }
}

/// Holds at most one predicate awaited over the next dispatched actions.
pub(crate) struct WaitRegister<A> {
    slot: Option<Registration<A>>,
}

impl<A: Action> WaitRegister<A> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Install a registration and return the receiver that yields the
    /// matching action.
    ///
    /// A registration still in the slot is dropped, which fails its waiter.
    pub fn register(&mut self, predicate: Predicate<A>) -> oneshot::Receiver<A> {
        let (resolve, rx) = oneshot::channel();
        let previous = self.slot.replace(Registration { predicate, resolve });
        if let Some(previous) = previous.filter(Registration::is_live) {
            tracing::warn!(
                predicate = ?previous.predicate,
                "wait_for called while a registration was outstanding; replacing it"
            );
        }
        rx
    }

    /// A registration whose waiter was dropped (e.g. the losing side of a
    /// `select`) does not count.
    pub fn is_registered(&self) -> bool {
        self.slot.as_ref().is_some_and(Registration::is_live)
    }

    /// Post-apply hook. Consumes the registration if `action` satisfies it.
    ///
    /// Returns true when a waiter was handed the action.
    pub fn notify(&mut self, action: &A) -> bool {
        if !self.is_registered() {
            self.slot = None;
            return false;
        }
        let matched = self
            .slot
            .as_ref()
            .is_some_and(|registration| registration.predicate.test(action));
        if !matched {
            return false;
        }
        let Some(registration) = self.slot.take() else {
            return false;
        };
        registration.resolve.send(action.clone()).is_ok()
    }
}
