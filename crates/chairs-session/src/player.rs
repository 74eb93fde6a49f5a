//! Player actor: waits for the music, races for a chair, leaves when it
//! finds none.

use std::sync::Arc;

use chairs_state::{PlayerId, SeatOutcome};
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::{GameSession, MusicCue, MusicPhase, SessionError};

/// Where a player is in its round loop.
///
/// ```text
/// WaitingForMusic → AttemptingSeat → Seated ──→ WaitingForMusic
///                                  └→ Eliminated (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    WaitingForMusic,
    AttemptingSeat,
    Seated,
    Eliminated,
}

impl PlayerState {
    /// Returns `true` once the player is out of the game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Eliminated)
    }
}

/// How a player's task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerReport {
    pub player: PlayerId,
    /// Rounds in which the player got a chair.
    pub rounds_seated: u32,
    /// Round the player was eliminated in, `None` for the winner.
    pub eliminated_in: Option<u32>,
}

pub(crate) struct Player {
    id: PlayerId,
    state: PlayerState,
    session: Arc<GameSession>,
    music: watch::Receiver<MusicPhase>,
}

impl Player {
    pub(crate) fn new(id: PlayerId, session: Arc<GameSession>) -> Self {
        let music = session.subscribe_music();
        Self {
            id,
            state: PlayerState::WaitingForMusic,
            session,
            music,
        }
    }

    /// Runs the round loop until eliminated or the game ends.
    pub(crate) async fn run(mut self) -> Result<PlayerReport, SessionError> {
        debug!(player = %self.id, "player joined");

        let mut next_round = 1;
        let mut rounds_seated = 0;

        while self.session.is_active() && self.session.players_remaining().await > 1 {
            self.transition(PlayerState::WaitingForMusic);
            let round = match self
                .session
                .wait_for_music(&mut self.music, next_round)
                .await?
            {
                MusicCue::Stopped { round } => round,
                MusicCue::GameOver => break,
            };

            self.transition(PlayerState::AttemptingSeat);
            match self.session.attempt_seat(self.id).await? {
                SeatOutcome::Seated { seats_left } => {
                    self.transition(PlayerState::Seated);
                    rounds_seated += 1;
                    next_round = round + 1;
                    debug!(player = %self.id, round, seats_left, "seated");
                }
                SeatOutcome::Denied => {
                    self.transition(PlayerState::Eliminated);
                    self.session.eliminate_player(self.id).await?;
                    return Ok(PlayerReport {
                        player: self.id,
                        rounds_seated,
                        eliminated_in: Some(round),
                    });
                }
            }
        }

        info!(player = %self.id, rounds_seated, "player left the game standing");
        Ok(PlayerReport {
            player: self.id,
            rounds_seated,
            eliminated_in: None,
        })
    }

    fn transition(&mut self, next: PlayerState) {
        trace!(player = %self.id, from = ?self.state, to = ?next, "player state");
        self.state = next;
    }
}
