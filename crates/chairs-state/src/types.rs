//! Core types shared by the referee, the players, and anyone watching.
//!
//! Events are serializable so a run can be logged as JSON lines as well as
//! narrated in prose.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Players are numbered `1..=N` when the game starts. The newtype keeps
/// player ids from being confused with round numbers or seat counts, which
/// are all small integers too.
///
/// `#[serde(transparent)]` serializes `PlayerId(3)` as plain `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SeatOutcome
// ---------------------------------------------------------------------------

/// The result of one player's seat attempt.
///
/// Internally the game still tracks the loser with a sentinel counter
/// value; this enum is the explicit form handed to callers so they never
/// compare against `-1` themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatOutcome {
    /// The player got a chair. `seats_left` is how many chairs were still
    /// free after this one was taken.
    Seated { seats_left: usize },

    /// The player was the one left standing. Exactly one attempt per round
    /// produces this.
    Denied,
}

impl SeatOutcome {
    /// Returns `true` if the player got a chair.
    pub fn is_seated(&self) -> bool {
        matches!(self, Self::Seated { .. })
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Something observable that happened during the game.
///
/// Events are published in causal order: a round's `PlayerEliminated`
/// always precedes the next round's `RoundStarted`, and a round's
/// `MusicStopped` always precedes its `PlayerSeated` events.
///
/// `#[serde(tag = "event")]` produces JSON like
/// `{"event":"player_seated","round":1,"player":3}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A round began with `seats` chairs for `players` players.
    RoundStarted {
        round: u32,
        players: usize,
        seats: usize,
    },

    /// The music started; it will play for `duration_ms`.
    MusicStarted { round: u32, duration_ms: u64 },

    /// The music stopped and every waiting player was released.
    MusicStopped { round: u32 },

    /// A player got a chair this round.
    PlayerSeated { round: u32, player: PlayerId },

    /// A player found no chair and left the game.
    PlayerEliminated {
        round: u32,
        player: PlayerId,
        players_remaining: usize,
    },

    /// One player remains.
    GameOver { winner: PlayerId, rounds: u32 },
}

impl GameEvent {
    /// The round this event belongs to. `GameOver` reports the last round
    /// played.
    pub fn round(&self) -> u32 {
        match self {
            Self::RoundStarted { round, .. }
            | Self::MusicStarted { round, .. }
            | Self::MusicStopped { round }
            | Self::PlayerSeated { round, .. }
            | Self::PlayerEliminated { round, .. } => *round,
            Self::GameOver { rounds, .. } => *rounds,
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundStarted {
                round,
                players,
                seats,
            } => write!(f, "round {round}: {players} players, {seats} chairs"),
            Self::MusicStarted { round, duration_ms } => {
                write!(f, "round {round}: the music started ({duration_ms} ms)")
            }
            Self::MusicStopped { round } => write!(f, "round {round}: the music stopped"),
            Self::PlayerSeated { round, player } => {
                write!(f, "round {round}: {player} found a chair")
            }
            Self::PlayerEliminated {
                round,
                player,
                players_remaining,
            } => write!(
                f,
                "round {round}: {player} was eliminated, {players_remaining} players remain"
            ),
            Self::GameOver { winner, rounds } => {
                write!(f, "{winner} wins after {rounds} rounds")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GameOutcome
// ---------------------------------------------------------------------------

/// Summary of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// The one player who was never eliminated.
    pub winner: PlayerId,
    /// Number of rounds played (always starting players − 1).
    pub rounds: u32,
    /// Eliminated players, first out first.
    pub eliminations: Vec<PlayerId>,
}
