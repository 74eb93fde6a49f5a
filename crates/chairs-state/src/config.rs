//! Game configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{PlayerId, StateError};

/// Configuration for one game.
///
/// The only input the game takes is how many players start. Chairs are
/// always one fewer than the players still in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players at the start of the game.
    pub players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { players: 4 }
    }
}

impl GameConfig {
    /// Fewest players that still leave one chair to fight over.
    pub const MIN_PLAYERS: usize = 2;

    /// Most players a single game will spawn.
    pub const MAX_PLAYERS: usize = 1024;

    /// Create a config for a specific player count.
    pub fn with_players(players: usize) -> Self {
        Self { players }
    }

    /// Check the config before a game starts.
    ///
    /// The starting player count is fixed for the whole game, so it is
    /// never adjusted here: counts outside
    /// [`Self::MIN_PLAYERS`]`..=`[`Self::MAX_PLAYERS`] are rejected.
    pub fn validated(self) -> Result<Self, StateError> {
        if self.players < Self::MIN_PLAYERS {
            return Err(StateError::InvalidConfig(format!(
                "need at least {} players, got {}",
                Self::MIN_PLAYERS,
                self.players
            )));
        }
        if self.players > Self::MAX_PLAYERS {
            warn!(
                players = self.players,
                max = Self::MAX_PLAYERS,
                "player count exceeds maximum"
            );
            return Err(StateError::InvalidConfig(format!(
                "at most {} players, got {}",
                Self::MAX_PLAYERS,
                self.players
            )));
        }
        Ok(self)
    }

    /// Chairs available in the first round.
    pub fn initial_seats(&self) -> usize {
        self.players.saturating_sub(1)
    }

    /// Ids of every starting player, `P-1` through `P-N`.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (1..=self.players as u64).map(PlayerId)
    }
}
