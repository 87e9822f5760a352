//! Typed errors for driver and storyline operations.

use thiserror::Error;

use crate::effect::Effect;

/// Errors surfaced by the engine and the coordination API.
#[derive(Debug, Error)]
pub enum StorylineError {
    /// `resolve_effect` was given a descriptor that matches nothing pending.
    #[error("could not find effect to resolve: {effect}")]
    UnresolvedEffect { effect: Effect },

    /// The store rejected an action.
    #[error("store rejected action: {0}")]
    Store(#[source] anyhow::Error),

    /// A newer `wait_for` replaced this registration before it matched.
    #[error("wait registration superseded before a matching action arrived")]
    Superseded,

    /// The engine was dropped while the effect was still pending. Only a
    /// `StorylineApi` clone that outlives its engine can observe this.
    #[error("engine dropped before the effect was resolved")]
    Abandoned,

    /// An effect result could not be decoded into the requested type.
    #[error("could not decode effect result: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for engine operations.
pub type StorylineResult<T> = std::result::Result<T, StorylineError>;
