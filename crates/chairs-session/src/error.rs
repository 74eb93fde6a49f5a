//! Error types for the session layer.

use chairs_state::StateError;

/// Errors that end an actor.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The seat protocol was broken. The actor that noticed aborted the game.
    #[error("invariant violation: {0}")]
    Invariant(#[from] StateError),

    /// Another actor aborted the game; this one was woken and stopped.
    #[error("game aborted")]
    Aborted,

    /// An actor task panicked or was cancelled.
    #[error("actor task failed: {0}")]
    ActorFailed(String),
}

impl SessionError {
    /// Returns `true` for the error that caused an abort, as opposed to the
    /// knock-on [`SessionError::Aborted`] seen by every other actor.
    pub fn is_root_cause(&self) -> bool {
        !matches!(self, Self::Aborted)
    }
}
