//! The shared game session: counters plus every synchronization primitive.
//!
//! Both actor types hold an `Arc<GameSession>`. Nothing here is global, so
//! any number of games can run side by side (tests do).

use std::sync::atomic::{AtomicBool, Ordering};

use chairs_music::Song;
use chairs_state::{GameConfig, GameEvent, GameOutcome, GameState, PlayerId, SeatOutcome, StateError};
use tokio::sync::{Mutex, Semaphore, mpsc, watch};
use tracing::{debug, error, info, trace};

use crate::SessionError;

/// Channel sender for publishing game events to an observer.
pub type EventSender = mpsc::UnboundedSender<GameEvent>;

// ---------------------------------------------------------------------------
// Music phase
// ---------------------------------------------------------------------------

/// What the music is doing. This is the value carried by the music watch
/// channel: the "music stopped" flag and its broadcast in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicPhase {
    /// Music is playing for `round`. Players keep waiting.
    Playing { round: u32 },
    /// Music stopped for `round`. Players race for seats.
    Stopped { round: u32 },
    /// The game ended normally. Final broadcast.
    Finished,
    /// The game was aborted after an invariant violation.
    Aborted,
}

impl MusicPhase {
    /// What a player waiting for `round` wakes up to, or `None` if this
    /// phase should not wake it.
    fn cue(&self, round: u32) -> Option<Result<MusicCue, SessionError>> {
        match self {
            Self::Playing { .. } => None,
            Self::Stopped { round: stopped } if *stopped >= round => {
                Some(Ok(MusicCue::Stopped { round: *stopped }))
            }
            Self::Stopped { .. } => None,
            Self::Finished => Some(Ok(MusicCue::GameOver)),
            Self::Aborted => Some(Err(SessionError::Aborted)),
        }
    }
}

/// What a player woke up to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCue {
    /// The music stopped; go for a seat in `round`.
    Stopped { round: u32 },
    /// The game is over; leave without attempting a seat.
    GameOver,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// One game's shared state.
///
/// - `state` is the only data several actors write, so it sits behind a
///   mutex.
/// - `seat_permits` and `round_barrier` are the synchronization themselves
///   and need no extra lock.
pub struct GameSession {
    config: GameConfig,
    state: Mutex<GameState>,
    /// One permit per chair still grantable this round.
    seat_permits: Semaphore,
    /// The referee waits here until the round's loser has left.
    round_barrier: Semaphore,
    music: watch::Sender<MusicPhase>,
    active: AtomicBool,
    events: EventSender,
}

impl GameSession {
    /// Creates a session ready for round 1: `players − 1` seat permits, music
    /// playing, game active.
    pub fn new(config: GameConfig, events: EventSender) -> Result<Self, SessionError> {
        let config = config.validated()?;
        let state = GameState::new(&config);
        let (music, _) = watch::channel(MusicPhase::Playing { round: 1 });

        Ok(Self {
            seat_permits: Semaphore::new(config.initial_seats()),
            round_barrier: Semaphore::new(0),
            state: Mutex::new(state),
            music,
            active: AtomicBool::new(true),
            events,
            config,
        })
    }

    // -- referee side ------------------------------------------------------

    /// Announces round 1, whose permits were granted by [`new`](Self::new).
    pub async fn open(&self) -> u32 {
        let state = self.state.lock().await;
        let round = state.round();
        self.publish(GameEvent::RoundStarted {
            round,
            players: state.players_remaining(),
            seats: self.config.initial_seats(),
        });
        info!(
            round,
            players = state.players_remaining(),
            seats = self.config.initial_seats(),
            "game opened"
        );
        round
    }

    /// Resets the music flag and announces the song.
    pub fn play_music(&self, song: &Song) {
        self.set_music(MusicPhase::Playing { round: song.round });
        self.publish(GameEvent::MusicStarted {
            round: song.round,
            duration_ms: song.duration.as_millis() as u64,
        });
        info!(
            round = song.round,
            duration_ms = song.duration.as_millis() as u64,
            "music started"
        );
    }

    /// Stops the music and wakes every waiting player.
    pub fn stop_music(&self, round: u32) {
        // Published before the flag flips so it precedes every seat event.
        self.publish(GameEvent::MusicStopped { round });
        self.set_music(MusicPhase::Stopped { round });
        info!(round, "music stopped");
    }

    /// Grants the one extra permit that lets the standing player through to
    /// discover the sentinel.
    ///
    /// Exactly one, because chairs are always players − 1.
    pub fn release_loser_permit(&self) {
        self.seat_permits.add_permits(1);
        debug!("loser permit released");
    }

    /// Waits until a player has called
    /// [`eliminate_player`](Self::eliminate_player) for this round.
    pub async fn await_elimination(&self) -> Result<(), SessionError> {
        let permit = self
            .round_barrier
            .acquire()
            .await
            .map_err(|_| SessionError::Aborted)?;
        permit.forget();
        Ok(())
    }

    /// Starts the next round and grants its seat permits. Returns the new
    /// round number.
    pub async fn start_round(&self) -> u32 {
        let mut state = self.state.lock().await;
        let seats = state.start_round();
        let round = state.round();
        let players = state.players_remaining();
        self.publish(GameEvent::RoundStarted {
            round,
            players,
            seats,
        });
        drop(state);

        self.seat_permits.add_permits(seats);
        info!(round, players, seats, "round started");
        round
    }

    /// Ends the game: clears the active flag, then broadcasts one last time
    /// so no player stays blocked on the music.
    pub async fn end_game(&self) -> Result<PlayerId, SessionError> {
        let state = self.state.lock().await;
        let winner = match state.winner() {
            Ok(winner) => winner,
            Err(err) => {
                drop(state);
                return Err(self.abort(err));
            }
        };
        let rounds = state.round();
        self.active.store(false, Ordering::SeqCst);
        self.publish(GameEvent::GameOver { winner, rounds });
        drop(state);

        self.set_music(MusicPhase::Finished);
        info!(%winner, rounds, "game over");
        Ok(winner)
    }

    // -- player side -------------------------------------------------------

    /// A fresh receiver on the music channel.
    pub fn subscribe_music(&self) -> watch::Receiver<MusicPhase> {
        self.music.subscribe()
    }

    /// Blocks until the music stops for `round` (or later), or the game
    /// ends.
    ///
    /// Wake-ups that do not satisfy the condition are re-checked, never
    /// reported.
    pub async fn wait_for_music(
        &self,
        music: &mut watch::Receiver<MusicPhase>,
        round: u32,
    ) -> Result<MusicCue, SessionError> {
        let mut woke = None;
        music
            .wait_for(|phase| {
                woke = phase.cue(round);
                woke.is_some()
            })
            .await
            .map_err(|_| SessionError::Aborted)?;

        if !self.is_active() {
            return if self.is_aborted() {
                Err(SessionError::Aborted)
            } else {
                Ok(MusicCue::GameOver)
            };
        }
        woke.unwrap_or(Err(SessionError::Aborted))
    }

    /// Acquires a seat permit, then takes a seat under the state lock.
    ///
    /// The permit is consumed, not returned: chairs are refilled by
    /// [`start_round`](Self::start_round).
    pub async fn attempt_seat(&self, player: PlayerId) -> Result<SeatOutcome, SessionError> {
        let permit = self
            .seat_permits
            .acquire()
            .await
            .map_err(|_| SessionError::Aborted)?;
        permit.forget();

        let mut state = self.state.lock().await;
        let round = state.round();
        let outcome = match state.take_seat() {
            Ok(outcome) => outcome,
            Err(err) => {
                drop(state);
                return Err(self.abort(err));
            }
        };
        if outcome.is_seated() {
            // Under the lock, so every seat event precedes the elimination.
            self.publish(GameEvent::PlayerSeated { round, player });
        }
        drop(state);

        trace!(round, %player, ?outcome, "seat attempt");
        Ok(outcome)
    }

    /// Removes the sentinel holder and signals the round barrier. Returns
    /// the players left.
    pub async fn eliminate_player(&self, player: PlayerId) -> Result<usize, SessionError> {
        let mut state = self.state.lock().await;
        let round = state.round();
        let remaining = match state.eliminate_player(player) {
            Ok(remaining) => remaining,
            Err(err) => {
                drop(state);
                return Err(self.abort(err));
            }
        };
        self.publish(GameEvent::PlayerEliminated {
            round,
            player,
            players_remaining: remaining,
        });
        drop(state);

        info!(round, %player, players_remaining = remaining, "player eliminated");
        self.round_barrier.add_permits(1);
        Ok(remaining)
    }

    // -- shared --------------------------------------------------------------

    /// Aborts the game after an invariant violation and wakes every actor.
    fn abort(&self, err: StateError) -> SessionError {
        error!(error = %err, "invariant violation, aborting game");
        self.active.store(false, Ordering::SeqCst);
        self.music.send_replace(MusicPhase::Aborted);
        self.seat_permits.close();
        self.round_barrier.close();
        SessionError::Invariant(err)
    }

    /// Moves the music to `next` and wakes every receiver. An aborted game
    /// stays aborted.
    fn set_music(&self, next: MusicPhase) {
        self.music.send_if_modified(|phase| {
            if *phase == MusicPhase::Aborted {
                return false;
            }
            *phase = next;
            true
        });
    }

    /// Sends an event to the observer. Silently drops it if nobody listens.
    fn publish(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }

    /// Whether the game is still running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Whether the game was aborted.
    pub fn is_aborted(&self) -> bool {
        matches!(*self.music.borrow(), MusicPhase::Aborted)
    }

    /// Players still in the game.
    pub async fn players_remaining(&self) -> usize {
        self.state.lock().await.players_remaining()
    }

    /// Current round number.
    pub async fn round(&self) -> u32 {
        self.state.lock().await.round()
    }

    /// Seats left this round, as the raw counter.
    pub async fn seats_remaining(&self) -> i64 {
        self.state.lock().await.seats_remaining()
    }

    /// Seat permits currently grantable.
    pub fn available_seat_permits(&self) -> usize {
        self.seat_permits.available_permits()
    }

    /// The current music phase.
    pub fn music_phase(&self) -> MusicPhase {
        *self.music.borrow()
    }

    /// The validated configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Summary of the game so far. Fails until one player remains.
    pub async fn outcome(&self) -> Result<GameOutcome, StateError> {
        let state = self.state.lock().await;
        Ok(GameOutcome {
            winner: state.winner()?,
            rounds: state.round(),
            eliminations: state.eliminations().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn session(players: usize) -> (GameSession, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = GameSession::new(GameConfig::with_players(players), tx).unwrap();
        (session, rx)
    }

    #[test]
    fn test_new_grants_initial_seats() {
        let (s, _rx) = session(4);
        assert_eq!(s.available_seat_permits(), 3);
        assert!(s.is_active());
        assert_eq!(s.music_phase(), MusicPhase::Playing { round: 1 });
    }

    #[test]
    fn test_new_rejects_one_player() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = GameSession::new(GameConfig::with_players(1), tx);
        assert!(matches!(
            result,
            Err(SessionError::Invariant(StateError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_music_phase_cue() {
        assert!(MusicPhase::Playing { round: 2 }.cue(2).is_none());
        assert!(MusicPhase::Stopped { round: 1 }.cue(2).is_none());
        assert!(matches!(
            MusicPhase::Stopped { round: 2 }.cue(2),
            Some(Ok(MusicCue::Stopped { round: 2 }))
        ));
        assert!(matches!(
            MusicPhase::Finished.cue(7),
            Some(Ok(MusicCue::GameOver))
        ));
        assert!(matches!(
            MusicPhase::Aborted.cue(7),
            Some(Err(SessionError::Aborted))
        ));
    }

    #[tokio::test]
    async fn test_stop_music_wakes_waiter() {
        let (s, _rx) = session(3);
        let s = Arc::new(s);
        let mut music = s.subscribe_music();

        let waiter = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.wait_for_music(&mut music, 1).await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        s.stop_music(1);
        let cue = waiter.await.unwrap().unwrap();
        assert_eq!(cue, MusicCue::Stopped { round: 1 });
    }

    #[tokio::test]
    async fn test_previous_round_stop_does_not_release() {
        let (s, _rx) = session(3);
        let mut music = s.subscribe_music();
        s.stop_music(1);

        let result =
            tokio::time::timeout(Duration::from_millis(20), s.wait_for_music(&mut music, 2)).await;
        assert!(result.is_err(), "round 2 waiter woke on round 1's stop");
    }

    #[tokio::test]
    async fn test_round_one_seats_then_sentinel() {
        let (s, mut rx) = session(3);
        s.stop_music(1);

        assert!(s.attempt_seat(PlayerId(1)).await.unwrap().is_seated());
        assert!(s.attempt_seat(PlayerId(2)).await.unwrap().is_seated());
        assert_eq!(s.available_seat_permits(), 0);

        s.release_loser_permit();
        assert_eq!(s.attempt_seat(PlayerId(3)).await.unwrap(), SeatOutcome::Denied);
        assert_eq!(s.seats_remaining().await, chairs_state::SEAT_SENTINEL);

        assert_eq!(s.eliminate_player(PlayerId(3)).await.unwrap(), 2);
        s.await_elimination().await.unwrap();

        assert_eq!(rx.recv().await, Some(GameEvent::MusicStopped { round: 1 }));
        assert_eq!(
            rx.recv().await,
            Some(GameEvent::PlayerSeated {
                round: 1,
                player: PlayerId(1)
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(GameEvent::PlayerSeated {
                round: 1,
                player: PlayerId(2)
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(GameEvent::PlayerEliminated {
                round: 1,
                player: PlayerId(3),
                players_remaining: 2
            })
        );
    }

    #[tokio::test]
    async fn test_loser_blocks_until_extra_permit() {
        let (s, _rx) = session(4);
        let s = Arc::new(s);
        s.stop_music(1);

        for id in 1..=3 {
            assert!(s.attempt_seat(PlayerId(id)).await.unwrap().is_seated());
        }
        assert_eq!(s.available_seat_permits(), 0);

        let loser = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.attempt_seat(PlayerId(4)).await })
        };
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(!loser.is_finished(), "loser sat down without a permit");
        assert_eq!(s.seats_remaining().await, 0);

        s.release_loser_permit();
        assert_eq!(loser.await.unwrap().unwrap(), SeatOutcome::Denied);
        assert_eq!(s.seats_remaining().await, chairs_state::SEAT_SENTINEL);
    }

    #[tokio::test]
    async fn test_start_round_grants_one_fewer_seat() {
        let (s, _rx) = session(4);
        for id in 1..=3 {
            s.attempt_seat(PlayerId(id)).await.unwrap();
        }
        s.release_loser_permit();
        s.attempt_seat(PlayerId(4)).await.unwrap();
        s.eliminate_player(PlayerId(4)).await.unwrap();

        assert_eq!(s.start_round().await, 2);
        assert_eq!(s.available_seat_permits(), 2);
        assert_eq!(s.seats_remaining().await, 2);
    }

    #[tokio::test]
    async fn test_elimination_without_sentinel_aborts() {
        let (s, _rx) = session(4);
        let mut music = s.subscribe_music();

        let err = s.eliminate_player(PlayerId(2)).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Invariant(StateError::NotSentinelHolder { .. })
        ));

        assert!(!s.is_active());
        assert!(s.is_aborted());
        assert!(matches!(
            s.await_elimination().await,
            Err(SessionError::Aborted)
        ));
        assert!(matches!(
            s.attempt_seat(PlayerId(1)).await,
            Err(SessionError::Aborted)
        ));
        assert!(matches!(
            s.wait_for_music(&mut music, 1).await,
            Err(SessionError::Aborted)
        ));
    }

    #[tokio::test]
    async fn test_end_game_releases_waiters() {
        let (s, _rx) = session(2);
        let s = Arc::new(s);
        let mut music = s.subscribe_music();

        s.stop_music(1);
        s.attempt_seat(PlayerId(1)).await.unwrap();
        s.release_loser_permit();
        s.attempt_seat(PlayerId(2)).await.unwrap();
        s.eliminate_player(PlayerId(2)).await.unwrap();

        // P-1 goes back to waiting for a round that never comes.
        let waiter = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.wait_for_music(&mut music, 2).await })
        };
        tokio::task::yield_now().await;

        assert_eq!(s.end_game().await.unwrap(), PlayerId(1));
        assert_eq!(waiter.await.unwrap().unwrap(), MusicCue::GameOver);
        assert!(!s.is_active());
        assert!(!s.is_aborted());

        let outcome = s.outcome().await.unwrap();
        assert_eq!(outcome.winner, PlayerId(1));
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.eliminations, vec![PlayerId(2)]);
    }
}
