//! Referee actor: plays the music, stops it, and advances rounds.

use std::sync::Arc;

use chairs_music::{MusicMetrics, MusicTimer};
use chairs_state::PlayerId;
use tracing::{debug, info, trace};

use crate::{GameSession, SessionError};

/// Where the referee is in its round loop.
///
/// ```text
/// PlayMusic → StopMusic → ReleaseLoserPermit → AwaitElimination ─┬→ StartNextRound → PlayMusic
///                                                                └→ EndGame (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefereeState {
    PlayMusic,
    StopMusic,
    ReleaseLoserPermit,
    AwaitElimination,
    StartNextRound,
    EndGame,
}

/// How the referee's task ended.
#[derive(Debug, Clone)]
pub struct RefereeReport {
    pub winner: PlayerId,
    pub rounds: u32,
    pub music: MusicMetrics,
}

pub(crate) struct Referee {
    state: RefereeState,
    session: Arc<GameSession>,
    timer: MusicTimer,
}

impl Referee {
    pub(crate) fn new(session: Arc<GameSession>, timer: MusicTimer) -> Self {
        Self {
            state: RefereeState::PlayMusic,
            session,
            timer,
        }
    }

    /// Runs rounds until one player remains.
    ///
    /// Never retries and never times out: every wait is expected to
    /// succeed unless another actor aborts the game.
    pub(crate) async fn run(mut self) -> Result<RefereeReport, SessionError> {
        let mut round = self.session.open().await;

        loop {
            if !self.session.is_active() {
                return Err(SessionError::Aborted);
            }

            self.transition(RefereeState::PlayMusic);
            let song = self.timer.next_song(round);
            self.session.play_music(&song);
            self.timer.play(song).await;

            self.transition(RefereeState::StopMusic);
            self.session.stop_music(round);

            self.transition(RefereeState::ReleaseLoserPermit);
            self.session.release_loser_permit();

            self.transition(RefereeState::AwaitElimination);
            self.session.await_elimination().await?;

            let remaining = self.session.players_remaining().await;
            debug!(round, players_remaining = remaining, "round complete");

            if remaining <= 1 {
                self.transition(RefereeState::EndGame);
                let winner = self.session.end_game().await?;
                info!(
                    %winner,
                    rounds = round,
                    songs = self.timer.metrics().songs_played,
                    "referee finished"
                );
                return Ok(RefereeReport {
                    winner,
                    rounds: round,
                    music: self.timer.metrics().clone(),
                });
            }

            self.transition(RefereeState::StartNextRound);
            round = self.session.start_round().await;
        }
    }

    fn transition(&mut self, next: RefereeState) {
        trace!(from = ?self.state, to = ?next, "referee state");
        self.state = next;
    }
}
