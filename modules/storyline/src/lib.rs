//! Storyline coordination engine.
//!
//! A storyline is one `async` control flow that pauses on store actions
//! (`wait_for`), asks for side effects it never runs itself (`perform_io`),
//! and dispatches actions of its own. A driver, usually a test, feeds actions
//! into the [`Engine`] and resolves the pending effects. Every driver call
//! returns once the storyline is done or parked again, so what the driver
//! reads next is deterministic.
//!
//! Consumers provide the store by implementing [`Store`], or use
//! [`ReducerStore`] with [`Reducer`]s and [`Middleware`]s.

pub mod action;
pub mod api;
pub mod effect;
pub mod engine;
pub mod error;
pub mod journal;
pub mod lifecycle;
mod queue;
mod rendezvous;
pub mod store;
mod wait;

pub use action::{Action, Predicate};
pub use api::StorylineApi;
pub use effect::{Effect, Handle};
pub use engine::Engine;
pub use error::{StorylineError, StorylineResult};
pub use journal::{AppliedAction, Origin};
pub use lifecycle::{Outcome, Phase, SuspendedOn};
pub use store::{
    ActionLogger, Identity, JsonStore, Middleware, Reducer, ReducerStore, Slices, Store,
    StoreOptions,
};
