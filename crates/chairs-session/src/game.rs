//! Bootstrap: spawn one task per player plus the referee, then collect them.

use std::sync::Arc;

use chairs_music::{MusicConfig, MusicMetrics, MusicTimer};
use chairs_state::{GameConfig, GameOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::player::Player;
use crate::referee::Referee;
use crate::{EventSender, GameSession, PlayerReport, RefereeReport, SessionError};

/// Everything a finished game produced.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub outcome: GameOutcome,
    pub music: MusicMetrics,
    /// One report per starting player, in id order.
    pub players: Vec<PlayerReport>,
}

/// Handle to a running game.
pub struct GameHandle {
    session: Arc<GameSession>,
    referee: JoinHandle<Result<RefereeReport, SessionError>>,
    players: Vec<JoinHandle<Result<PlayerReport, SessionError>>>,
}

impl GameHandle {
    /// The shared session, for inspection while the game runs.
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Waits for every actor to finish.
    ///
    /// If the game was aborted, returns the violation that caused it rather
    /// than the [`SessionError::Aborted`] the other actors saw.
    pub async fn join(self) -> Result<GameReport, SessionError> {
        let mut failure = None;

        let mut players = Vec::with_capacity(self.players.len());
        for handle in self.players {
            match flatten(handle.await) {
                Ok(report) => players.push(report),
                Err(err) => keep_root_cause(&mut failure, err),
            }
        }

        let referee = match flatten(self.referee.await) {
            Ok(report) => Some(report),
            Err(err) => {
                keep_root_cause(&mut failure, err);
                None
            }
        };

        if let Some(err) = failure {
            tracing::error!(error = %err, "game failed");
            return Err(err);
        }
        let referee = referee.ok_or(SessionError::Aborted)?;
        let outcome = self.session.outcome().await?;

        tracing::info!(
            winner = %outcome.winner,
            rounds = outcome.rounds,
            "game complete"
        );
        Ok(GameReport {
            outcome,
            music: referee.music,
            players,
        })
    }
}

fn flatten<T>(
    joined: Result<Result<T, SessionError>, tokio::task::JoinError>,
) -> Result<T, SessionError> {
    joined.map_err(|e| SessionError::ActorFailed(e.to_string()))?
}

fn keep_root_cause(slot: &mut Option<SessionError>, err: SessionError) {
    match slot {
        Some(existing) if existing.is_root_cause() => {}
        _ => *slot = Some(err),
    }
}

/// Spawns the referee and every player onto the current Tokio runtime.
///
/// Events are published on `events`; drop the receiver if nobody needs
/// them.
pub fn spawn_game(
    config: GameConfig,
    music: MusicConfig,
    events: EventSender,
) -> Result<GameHandle, SessionError> {
    let session = Arc::new(GameSession::new(config, events)?);

    let players = session
        .config()
        .player_ids()
        .map(|id| tokio::spawn(Player::new(id, Arc::clone(&session)).run()))
        .collect();

    let timer = MusicTimer::new(music);
    let referee = tokio::spawn(Referee::new(Arc::clone(&session), timer).run());

    tracing::info!(
        players = session.config().players,
        seats = session.config().initial_seats(),
        "game spawned"
    );

    Ok(GameHandle {
        session,
        referee,
        players,
    })
}

/// Runs a whole game without an observer.
pub async fn run_game(config: GameConfig, music: MusicConfig) -> Result<GameReport, SessionError> {
    let (events, _) = mpsc::unbounded_channel();
    spawn_game(config, music, events)?.join().await
}
