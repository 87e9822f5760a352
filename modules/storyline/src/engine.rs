//! The driver-facing engine and the quiescence loop.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{poll_fn, LocalBoxFuture};
use futures::task::noop_waker_ref;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::api::StorylineApi;
use crate::effect::Effect;
use crate::error::{StorylineError, StorylineResult};
use crate::journal::{AppliedAction, Journal, Origin};
use crate::lifecycle::{Outcome, Phase, SuspendedOn};
use crate::queue::{Delivery, EffectQueue};
use crate::rendezvous::{Rendezvous, Verdict};
use crate::store::Store;
use crate::wait::WaitRegister;

/// Engine state shared with the storyline's [`StorylineApi`].
///
/// Every field is borrowed only for the duration of one call and never across
/// an await or a poll of the storyline.
pub(crate) struct Shared<St: Store> {
    store: RefCell<St>,
    pub(crate) wait: RefCell<WaitRegister<St::Action>>,
    pub(crate) effects: RefCell<EffectQueue>,
    journal: RefCell<Journal<St::Action>>,
    pub(crate) rendezvous: Rendezvous,
    phase: RefCell<Phase>,
}

impl<St: Store> Shared<St> {
    fn new(store: St) -> Self {
        Self {
            store: RefCell::new(store),
            wait: RefCell::new(WaitRegister::new()),
            effects: RefCell::new(EffectQueue::new()),
            journal: RefCell::new(Journal::new()),
            rendezvous: Rendezvous::new(),
            phase: RefCell::new(Phase::NotStarted),
        }
    }

    /// Store apply, journal, then the wait register as the last post-apply
    /// hook.
    pub(crate) fn apply(&self, action: St::Action, origin: Origin) -> StorylineResult<()> {
        self.store
            .borrow_mut()
            .dispatch(&action)
            .map_err(StorylineError::Store)?;

        let seq = self.journal.borrow_mut().record(origin, action.clone());
        debug!(seq, ?origin, action_type = action.action_type(), "Action dispatched");

        if self.wait.borrow_mut().notify(&action) {
            debug!(seq, "Wait registration satisfied");
            self.rendezvous.raise_woken();
        }
        Ok(())
    }

    pub(crate) fn state(&self) -> St::State {
        self.store.borrow().state().clone()
    }

    /// Only registrations and effects something still awaits count; the
    /// losing side of a `select` leaves dead entries behind.
    fn parked(&self) -> bool {
        self.wait.borrow().is_registered() || self.effects.borrow().has_waiters()
    }

    fn suspended_on(&self) -> SuspendedOn {
        if self.wait.borrow().is_registered() {
            SuspendedOn::Action
        } else if self.effects.borrow().has_waiters() {
            SuspendedOn::Effect
        } else {
            SuspendedOn::External
        }
    }

    fn advance(&self, next: Phase) {
        self.phase.borrow_mut().advance(next);
    }

    fn finish(&self, result: anyhow::Result<()>) {
        let outcome = match result {
            Ok(()) => {
                info!(actions = self.journal.borrow().len(), "Storyline completed");
                Outcome::Completed
            }
            Err(e) => {
                error!(
                    error = %e,
                    pending_effects = self.effects.borrow().len(),
                    "Storyline failed"
                );
                Outcome::Failed(Arc::new(e))
            }
        };
        self.advance(Phase::Done(outcome));
    }
}

/// Drives one storyline against one store.
///
/// The storyline starts running as soon as the engine is built and advances
/// only inside the engine's own calls. `dispatch` and `resolve_effect` return
/// once the storyline is done or parked on a `wait_for`/`perform_io`, so the
/// driver can inspect [`pending_effects`](Self::pending_effects) and
/// [`get_state`](Self::get_state) right after.
///
/// The engine is `!Send`: keep it on one task.
pub struct Engine<St: Store> {
    shared: Rc<Shared<St>>,
    task: RefCell<Option<LocalBoxFuture<'static, anyhow::Result<()>>>>,
}

impl<St: Store> Engine<St> {
    /// Build the engine and run `storyline` up to its first suspension point.
    pub fn new<F, Fut>(storyline: F, store: St) -> Self
    where
        F: FnOnce(StorylineApi<St>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        let shared = Rc::new(Shared::new(store));
        let task = storyline(StorylineApi::new(Rc::clone(&shared))).boxed_local();
        let engine = Self {
            shared,
            task: RefCell::new(Some(task)),
        };
        engine.shared.advance(Phase::Running);

        // Nothing external can be awaited yet; a storyline that does so
        // anyway is picked up again by the next driver call.
        let mut cx = Context::from_waker(noop_waker_ref());
        let _ = engine.poll_settled(&mut cx);
        engine
    }

    /// Dispatch an action, then wait for the storyline to settle.
    pub async fn dispatch(&self, action: St::Action) -> StorylineResult<()> {
        self.shared.apply(action, Origin::Driver)?;
        self.until_settled().await;
        Ok(())
    }

    /// Resolve the first pending effect structurally equal to `effect`, then
    /// wait for the storyline to settle.
    ///
    /// Fails with [`StorylineError::UnresolvedEffect`] when nothing matches;
    /// the queue is left as it was.
    pub async fn resolve_effect(
        &self,
        effect: &Effect,
        value: impl Into<Value>,
    ) -> StorylineResult<()> {
        let delivery = self.shared.effects.borrow_mut().resolve(effect, value.into());
        match delivery {
            None => {
                return Err(StorylineError::UnresolvedEffect {
                    effect: effect.clone(),
                })
            }
            Some(Delivery::Delivered) => debug!(%effect, "Effect resolved"),
            Some(Delivery::Orphaned) => {
                warn!(%effect, "Effect resolved but nothing is waiting for it")
            }
        }
        self.until_settled().await;
        Ok(())
    }

    /// Wait until the storyline is done or parked on the engine.
    pub async fn until_settled(&self) {
        poll_fn(|cx| self.poll_settled(cx)).await
    }

    fn poll_settled(&self, cx: &mut Context<'_>) -> Poll<()> {
        let mut slot = self.task.borrow_mut();
        loop {
            let Some(task) = slot.as_mut() else {
                return Poll::Ready(());
            };

            self.shared.rendezvous.arm();
            self.shared.advance(Phase::Running);

            match task.as_mut().poll(cx) {
                Poll::Ready(result) => {
                    *slot = None;
                    self.shared.finish(result);
                    return Poll::Ready(());
                }
                Poll::Pending => match self.shared.rendezvous.verdict(self.shared.parked()) {
                    Verdict::Continue => continue,
                    Verdict::Quiescent => {
                        let on = self.shared.suspended_on();
                        debug!(?on, "Storyline blocked");
                        self.shared.advance(Phase::Suspended(on));
                        return Poll::Ready(());
                    }
                    Verdict::External => {
                        self.shared.advance(Phase::Suspended(SuspendedOn::External));
                        return Poll::Pending;
                    }
                },
            }
        }
    }

    /// Pending effect descriptors, oldest first.
    pub fn pending_effects(&self) -> Vec<Effect> {
        self.shared.effects.borrow().effects()
    }

    pub fn get_state(&self) -> St::State {
        self.shared.state()
    }

    pub fn is_done(&self) -> bool {
        self.shared.phase.borrow().is_done()
    }

    pub fn phase(&self) -> Phase {
        self.shared.phase.borrow().clone()
    }

    /// `None` until the storyline has finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match &*self.shared.phase.borrow() {
            Phase::Done(outcome) => Some(outcome.clone()),
            _ => None,
        }
    }

    /// The error the storyline failed with, if it did.
    pub fn failure(&self) -> Option<Arc<anyhow::Error>> {
        match self.outcome()? {
            Outcome::Failed(e) => Some(e),
            Outcome::Completed => None,
        }
    }

    /// Every action the store accepted, in order.
    pub fn history(&self) -> Vec<AppliedAction<St::Action>> {
        self.shared.journal.borrow().entries()
    }
}

/// Pending effects are dropped with the engine. A [`StorylineApi`] clone that
/// outlived it (say, on a `spawn_local` task) sees
/// [`StorylineError::Abandoned`] from `perform_io`.
impl<St: Store> Drop for Engine<St> {
    fn drop(&mut self) {
        let abandoned = self.shared.effects.borrow_mut().abandon_all();
        if abandoned > 0 {
            debug!(abandoned, "Engine dropped with effects pending");
        }
    }
}
