//! The coordination API handed to a running storyline.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::action::Predicate;
use crate::effect::Effect;
use crate::engine::Shared;
use crate::error::{StorylineError, StorylineResult};
use crate::journal::Origin;
use crate::store::Store;

/// The storyline's only way to suspend, dispatch, or read state.
///
/// Cheap to clone; every clone talks to the same engine.
pub struct StorylineApi<St: Store> {
    shared: Rc<Shared<St>>,
}

impl<St: Store> Clone for StorylineApi<St> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<St: Store> StorylineApi<St> {
    pub(crate) fn new(shared: Rc<Shared<St>>) -> Self {
        Self { shared }
    }

    /// Suspend until a dispatched action satisfies `predicate`, and resume
    /// with that action.
    ///
    /// Only one registration may be outstanding. Calling this again before the
    /// previous one matched replaces it, and the earlier waiter fails with
    /// [`StorylineError::Superseded`].
    pub async fn wait_for(
        &self,
        predicate: impl Into<Predicate<St::Action>>,
    ) -> StorylineResult<St::Action> {
        let predicate = predicate.into();
        debug!(?predicate, "Waiting for action");
        let superseding = self.shared.wait.borrow().is_registered();
        let rx = self.shared.wait.borrow_mut().register(predicate);
        if superseding {
            // The replaced waiter is now cancelled and must be polled again.
            self.shared.rendezvous.raise_woken();
        }
        self.shared.rendezvous.raise_blocked();
        rx.await.map_err(|_| StorylineError::Superseded)
    }

    /// Queue `effect` and suspend until the driver resolves a structurally
    /// equal descriptor. Resumes with the value the driver supplied.
    pub async fn perform_io(&self, effect: Effect) -> StorylineResult<Value> {
        debug!(%effect, "Effect requested");
        let rx = self.shared.effects.borrow_mut().push(effect);
        self.shared.rendezvous.raise_blocked();
        rx.await.map_err(|_| StorylineError::Abandoned)
    }

    /// [`perform_io`](Self::perform_io), decoding the result into `T`.
    pub async fn perform_io_as<T: DeserializeOwned>(&self, effect: Effect) -> StorylineResult<T> {
        let value = self.perform_io(effect).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Dispatch through the same pipeline the driver uses.
    pub async fn dispatch(&self, action: St::Action) -> StorylineResult<()> {
        self.shared.apply(action, Origin::Storyline)
    }

    pub fn get_state(&self) -> St::State {
        self.shared.state()
    }
}
