//! Round and player bookkeeping.
//!
//! `GameState` holds the only data that several actors mutate: the seat
//! counter. The session keeps it behind a mutex and every read-modify-write
//! below happens under that lock.

use crate::{GameConfig, PlayerId, SeatOutcome, StateError};

/// Seat counter value that marks the one player who found no chair.
pub const SEAT_SENTINEL: i64 = -1;

/// Counters for a single game.
///
/// ```text
///   start_round ──→ attempt_seat × players ──→ eliminate_player ──┐
///        ↑                                                        │
///        └────────────────────────────────────────────────────────┘
/// ```
///
/// Each round starts with `players_remaining − 1` seats. Every player
/// decrements the counter once; the decrement that lands on
/// [`SEAT_SENTINEL`] belongs to the loser.
#[derive(Debug, Clone)]
pub struct GameState {
    starting_players: usize,
    round: u32,
    players_remaining: usize,
    seats_remaining: i64,
    /// Who left in the current round, if anyone yet.
    eliminated_this_round: Option<PlayerId>,
    eliminations: Vec<PlayerId>,
}

impl GameState {
    /// Creates the state for round 1.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            starting_players: config.players,
            round: 1,
            players_remaining: config.players,
            seats_remaining: config.initial_seats() as i64,
            eliminated_this_round: None,
            eliminations: Vec::with_capacity(config.initial_seats()),
        }
    }

    /// Advances to the next round and resets the seat counter.
    ///
    /// Returns the number of seat permits the caller must grant.
    pub fn start_round(&mut self) -> usize {
        self.round += 1;
        self.eliminated_this_round = None;
        let seats = self.players_remaining.saturating_sub(1);
        self.seats_remaining = seats as i64;
        seats
    }

    /// Takes one seat and returns the post-decrement counter.
    ///
    /// [`SEAT_SENTINEL`] means the caller is the loser. Anything below it
    /// is never written: the attempt fails with
    /// [`StateError::SeatUnderflow`] instead.
    pub fn attempt_seat(&mut self) -> Result<i64, StateError> {
        let next = self.seats_remaining - 1;
        if next < SEAT_SENTINEL {
            return Err(StateError::SeatUnderflow {
                round: self.round,
                value: next,
            });
        }
        self.seats_remaining = next;
        Ok(next)
    }

    /// Like [`attempt_seat`](Self::attempt_seat), but returns the explicit
    /// outcome instead of the raw counter.
    pub fn take_seat(&mut self) -> Result<SeatOutcome, StateError> {
        let value = self.attempt_seat()?;
        if value == SEAT_SENTINEL {
            Ok(SeatOutcome::Denied)
        } else {
            Ok(SeatOutcome::Seated {
                seats_left: value as usize,
            })
        }
    }

    /// Removes `player` from the game. Returns the players left.
    ///
    /// Only legal once per round, and only while the counter sits at the
    /// sentinel.
    pub fn eliminate_player(&mut self, player: PlayerId) -> Result<usize, StateError> {
        if let Some(first) = self.eliminated_this_round {
            return Err(StateError::DoubleElimination {
                round: self.round,
                first,
                second: player,
            });
        }
        if self.seats_remaining != SEAT_SENTINEL || self.players_remaining <= 1 {
            return Err(StateError::NotSentinelHolder {
                player,
                round: self.round,
                seats: self.seats_remaining,
            });
        }

        self.players_remaining -= 1;
        self.eliminated_this_round = Some(player);
        self.eliminations.push(player);
        Ok(self.players_remaining)
    }

    /// Current round number (starts at 1).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Players still in the game.
    pub fn players_remaining(&self) -> usize {
        self.players_remaining
    }

    /// Seats left this round. [`SEAT_SENTINEL`] once the loser has tried.
    pub fn seats_remaining(&self) -> i64 {
        self.seats_remaining
    }

    /// Eliminated players, in order.
    pub fn eliminations(&self) -> &[PlayerId] {
        &self.eliminations
    }

    /// Returns `true` once a single player remains.
    pub fn is_decided(&self) -> bool {
        self.players_remaining == 1
    }

    /// The last player standing, once the game is decided.
    pub fn winner(&self) -> Result<PlayerId, StateError> {
        if !self.is_decided() {
            return Err(StateError::Undecided {
                players_remaining: self.players_remaining,
            });
        }
        (1..=self.starting_players as u64)
            .map(PlayerId)
            .find(|id| !self.eliminations.contains(id))
            .ok_or(StateError::Undecided {
                players_remaining: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four() -> GameState {
        GameState::new(&GameConfig::with_players(4))
    }

    #[test]
    fn test_new_state_starts_round_one() {
        let state = four();
        assert_eq!(state.round(), 1);
        assert_eq!(state.players_remaining(), 4);
        assert_eq!(state.seats_remaining(), 3);
        assert!(!state.is_decided());
    }

    #[test]
    fn test_last_attempt_hits_sentinel() {
        let mut state = four();
        assert_eq!(state.attempt_seat().unwrap(), 2);
        assert_eq!(state.attempt_seat().unwrap(), 1);
        assert_eq!(state.attempt_seat().unwrap(), 0);
        assert_eq!(state.attempt_seat().unwrap(), SEAT_SENTINEL);
    }

    #[test]
    fn test_attempt_below_sentinel_is_rejected() {
        let mut state = GameState::new(&GameConfig::with_players(2));
        state.attempt_seat().unwrap();
        state.attempt_seat().unwrap();
        let err = state.attempt_seat().unwrap_err();
        assert_eq!(err, StateError::SeatUnderflow { round: 1, value: -2 });
        // The counter is untouched by the failed attempt.
        assert_eq!(state.seats_remaining(), SEAT_SENTINEL);
    }

    #[test]
    fn test_take_seat_reports_outcome() {
        let mut state = GameState::new(&GameConfig::with_players(2));
        assert_eq!(
            state.take_seat().unwrap(),
            SeatOutcome::Seated { seats_left: 0 }
        );
        assert_eq!(state.take_seat().unwrap(), SeatOutcome::Denied);
    }

    #[test]
    fn test_eliminate_requires_sentinel() {
        let mut state = four();
        state.attempt_seat().unwrap();
        let err = state.eliminate_player(PlayerId(1)).unwrap_err();
        assert!(matches!(err, StateError::NotSentinelHolder { seats: 2, .. }));
        assert_eq!(state.players_remaining(), 4);
    }

    #[test]
    fn test_second_elimination_in_round_is_detected() {
        let mut state = GameState::new(&GameConfig::with_players(3));
        for _ in 0..3 {
            state.attempt_seat().unwrap();
        }
        assert_eq!(state.eliminate_player(PlayerId(2)).unwrap(), 2);

        let err = state.eliminate_player(PlayerId(3)).unwrap_err();
        assert_eq!(
            err,
            StateError::DoubleElimination {
                round: 1,
                first: PlayerId(2),
                second: PlayerId(3),
            }
        );
        assert_eq!(state.players_remaining(), 2);
    }

    #[test]
    fn test_start_round_resets_counter_and_marker() {
        let mut state = four();
        for _ in 0..4 {
            state.attempt_seat().unwrap();
        }
        state.eliminate_player(PlayerId(4)).unwrap();

        assert_eq!(state.start_round(), 2);
        assert_eq!(state.round(), 2);
        assert_eq!(state.seats_remaining(), 2);

        for _ in 0..3 {
            state.attempt_seat().unwrap();
        }
        // A new round allows a new elimination.
        assert_eq!(state.eliminate_player(PlayerId(1)).unwrap(), 2);
    }

    #[test]
    fn test_full_game_picks_winner() {
        let mut state = four();
        let losers = [PlayerId(2), PlayerId(4), PlayerId(1)];
        for (i, loser) in losers.iter().enumerate() {
            if i > 0 {
                state.start_round();
            }
            while state.seats_remaining() > SEAT_SENTINEL {
                state.attempt_seat().unwrap();
            }
            state.eliminate_player(*loser).unwrap();
        }

        assert!(state.is_decided());
        assert_eq!(state.round(), 3);
        assert_eq!(state.eliminations(), &losers);
        assert_eq!(state.winner().unwrap(), PlayerId(3));
    }

    #[test]
    fn test_winner_undecided_mid_game() {
        let state = four();
        assert_eq!(
            state.winner().unwrap_err(),
            StateError::Undecided {
                players_remaining: 4
            }
        );
    }
}
