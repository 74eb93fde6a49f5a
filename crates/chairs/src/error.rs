//! Unified error type for the chairs workspace.

use chairs_session::SessionError;
use chairs_state::StateError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChairsError {
    /// Invalid configuration or a broken state invariant.
    #[error(transparent)]
    State(#[from] StateError),

    /// An actor failed or the game was aborted.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ChairsError {
    /// Returns `true` if the seat protocol was broken at runtime.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Self::State(err) => err.is_invariant_violation(),
            Self::Session(SessionError::Invariant(err)) => err.is_invariant_violation(),
            Self::Session(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chairs_state::PlayerId;

    #[test]
    fn test_from_state_error() {
        let err: ChairsError = StateError::InvalidConfig("bad".into()).into();
        assert!(matches!(err, ChairsError::State(_)));
        assert!(err.to_string().contains("bad"));
        assert!(!err.is_invariant_violation());
    }

    #[test]
    fn test_from_session_error() {
        let err: ChairsError = SessionError::Invariant(StateError::SeatUnderflow {
            round: 2,
            value: -2,
        })
        .into();
        assert!(matches!(err, ChairsError::Session(_)));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_aborted_is_not_a_violation() {
        let err: ChairsError = SessionError::Aborted.into();
        assert!(!err.is_invariant_violation());
        assert_eq!(err.to_string(), "game aborted");
    }

    #[test]
    fn test_double_elimination_is_a_violation() {
        let err: ChairsError = StateError::DoubleElimination {
            round: 1,
            first: PlayerId(1),
            second: PlayerId(2),
        }
        .into();
        assert!(err.is_invariant_violation());
    }
}
