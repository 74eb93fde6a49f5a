//! Error types for the state layer.
//!
//! Every variant except [`StateError::InvalidConfig`] is an invariant
//! violation: the seat protocol broke, which means a synchronization bug,
//! not a condition to recover from.

use crate::PlayerId;

/// Errors raised by [`GameState`](crate::GameState) and
/// [`GameConfig`](crate::GameConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A seat attempt would push the counter below the sentinel. More
    /// players tried to sit than the round had permits for.
    #[error("seat counter underflow in round {round}: would reach {value}")]
    SeatUnderflow { round: u32, value: i64 },

    /// A second player tried to leave the game in the same round.
    #[error("round {round} already eliminated {first}, refusing to eliminate {second}")]
    DoubleElimination {
        round: u32,
        first: PlayerId,
        second: PlayerId,
    },

    /// A player asked to be eliminated without holding the sentinel.
    #[error("{player} is not the sentinel holder in round {round} (seats at {seats})")]
    NotSentinelHolder {
        player: PlayerId,
        round: u32,
        seats: i64,
    },

    /// The game ended without exactly one player left.
    #[error("game is undecided with {players_remaining} players remaining")]
    Undecided { players_remaining: usize },

    /// The configuration cannot describe a playable game.
    #[error("invalid game config: {0}")]
    InvalidConfig(String),
}

impl StateError {
    /// Returns `true` if this error means the seat protocol was broken.
    pub fn is_invariant_violation(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_elimination_message_names_both_players() {
        let err = StateError::DoubleElimination {
            round: 2,
            first: PlayerId(1),
            second: PlayerId(3),
        };
        let msg = err.to_string();
        assert!(msg.contains("P-1"));
        assert!(msg.contains("P-3"));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_invalid_config_is_not_a_violation() {
        let err = StateError::InvalidConfig("too few".into());
        assert!(!err.is_invariant_violation());
        assert!(err.to_string().contains("too few"));
    }
}
