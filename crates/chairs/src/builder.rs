//! `MusicalChairs` builder and game runner.
//!
//! This is the entry point for running a game. It ties together the layers:
//! config → session → actors.

use chairs_music::MusicConfig;
use chairs_session::{EventSender, GameReport, spawn_game};
use chairs_state::GameConfig;
use tokio::sync::mpsc;

use crate::ChairsError;

/// Builder for configuring a game.
///
/// # Example
///
/// ```rust,ignore
/// let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
/// let game = MusicalChairs::builder()
///     .players(6)
///     .events(tx)
///     .build()?;
/// let report = game.run().await?;
/// ```
pub struct GameBuilder {
    game: GameConfig,
    music: MusicConfig,
    events: Option<EventSender>,
}

impl GameBuilder {
    /// Creates a new builder with default settings (4 players, 2–7 s songs).
    pub fn new() -> Self {
        Self {
            game: GameConfig::default(),
            music: MusicConfig::default(),
            events: None,
        }
    }

    /// Sets the starting player count.
    pub fn players(mut self, players: usize) -> Self {
        self.game.players = players;
        self
    }

    /// Sets the music configuration.
    pub fn music(mut self, music: MusicConfig) -> Self {
        self.music = music;
        self
    }

    /// Publishes every game event on `events`.
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Validates the configuration.
    pub fn build(self) -> Result<MusicalChairs, ChairsError> {
        let game = self.game.validated()?;
        Ok(MusicalChairs {
            game,
            music: self.music.validated(),
            events: self.events,
        })
    }
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured game, ready to run.
pub struct MusicalChairs {
    game: GameConfig,
    music: MusicConfig,
    events: Option<EventSender>,
}

impl MusicalChairs {
    /// Creates a new builder.
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    /// The validated game configuration.
    pub fn config(&self) -> &GameConfig {
        &self.game
    }

    /// The validated music configuration.
    pub fn music_config(&self) -> &MusicConfig {
        &self.music
    }

    /// Spawns the referee and players and waits until one player remains.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn run(self) -> Result<GameReport, ChairsError> {
        let events = self
            .events
            .unwrap_or_else(|| mpsc::unbounded_channel().0);

        tracing::info!(
            players = self.game.players,
            chairs = self.game.initial_seats(),
            "musical chairs starting"
        );

        let handle = spawn_game(self.game, self.music, events)?;
        Ok(handle.join().await?)
    }
}
