//! Randomized round timer for musical chairs.
//!
//! The referee plays one "song" per round. Its length is drawn uniformly
//! from a bounded interval so players cannot predict when the music stops.
//! The exact distribution does not matter for correctness; any bounded
//! positive duration will do.
//!
//! # Integration
//!
//! The timer sits in the referee's round loop:
//!
//! ```ignore
//! loop {
//!     let song = timer.next_song(round);
//!     session.play_music(&song);
//!     timer.play(song).await;
//!     session.stop_music(round);
//!     // ...
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Bounds for how long the music plays each round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicConfig {
    /// Shortest song. Must be positive.
    pub min_duration: Duration,
    /// Longest song (inclusive).
    pub max_duration: Duration,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_secs(2),
            max_duration: Duration::from_secs(7),
        }
    }
}

impl MusicConfig {
    /// Floor applied to `min_duration`.
    pub const MIN_SONG: Duration = Duration::from_millis(1);

    /// Ceiling applied to `max_duration`.
    pub const MAX_SONG: Duration = Duration::from_secs(60);

    /// Songs of length drawn from `min..=max`.
    pub fn between(min_duration: Duration, max_duration: Duration) -> Self {
        Self {
            min_duration,
            max_duration,
        }
    }

    /// Every song lasts exactly `duration`.
    pub fn fixed(duration: Duration) -> Self {
        Self::between(duration, duration)
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`MusicTimer::new`]. Rules:
    /// - both bounds clamped to [`Self::MIN_SONG`]`..=`[`Self::MAX_SONG`].
    /// - `max_duration` forced ≥ `min_duration`.
    pub fn validated(mut self) -> Self {
        if self.min_duration < Self::MIN_SONG {
            warn!(
                min_ms = self.min_duration.as_secs_f64() * 1000.0,
                "min_duration below floor, clamping"
            );
            self.min_duration = Self::MIN_SONG;
        }
        if self.max_duration > Self::MAX_SONG {
            warn!(
                max_s = self.max_duration.as_secs_f64(),
                "max_duration above ceiling, clamping"
            );
            self.max_duration = Self::MAX_SONG;
        }
        self.min_duration = self.min_duration.min(Self::MAX_SONG);
        if self.max_duration < self.min_duration {
            self.max_duration = self.min_duration;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Song
// ---------------------------------------------------------------------------

/// One round's music.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Song {
    /// Round the song is played for.
    pub round: u32,
    /// How long it plays.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the music timer.
#[derive(Debug, Clone, Default)]
pub struct MusicMetrics {
    /// Songs played to the end.
    pub songs_played: u64,
    /// Sum of all song durations.
    pub total_play_time: Duration,
    /// Longest song so far.
    pub longest_song: Duration,
    /// Shortest song so far (`ZERO` until the first song ends).
    pub shortest_song: Duration,
}

impl MusicMetrics {
    /// Mean song length, or `ZERO` before any song was played.
    pub fn mean_song(&self) -> Duration {
        if self.songs_played == 0 {
            Duration::ZERO
        } else {
            self.total_play_time / self.songs_played as u32
        }
    }

    fn record(&mut self, played: Duration) {
        if self.songs_played == 0 || played < self.shortest_song {
            self.shortest_song = played;
        }
        if played > self.longest_song {
            self.longest_song = played;
        }
        self.songs_played += 1;
        self.total_play_time += played;
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Picks and plays one song per round. One timer per referee.
pub struct MusicTimer {
    config: MusicConfig,
    metrics: MusicMetrics,
}

impl MusicTimer {
    /// Create a timer from config.
    pub fn new(config: MusicConfig) -> Self {
        let config = config.validated();
        debug!(
            min_ms = config.min_duration.as_secs_f64() * 1000.0,
            max_ms = config.max_duration.as_secs_f64() * 1000.0,
            "music timer created"
        );
        Self {
            config,
            metrics: MusicMetrics::default(),
        }
    }

    /// Draw the next song's length.
    pub fn next_song(&self, round: u32) -> Song {
        let min_duration = self.config.min_duration;
        let max_duration = self.config.max_duration;
        let duration = if min_duration == max_duration {
            min_duration
        } else {
            rand::rng().random_range(min_duration..=max_duration)
        };
        trace!(round, duration_ms = duration.as_millis() as u64, "song picked");
        Song { round, duration }
    }

    /// Sleep until the song ends.
    pub async fn play(&mut self, song: Song) {
        let started = TokioInstant::now();
        time::sleep_until(started + song.duration).await;

        self.metrics.record(song.duration);
        debug!(
            round = song.round,
            played_ms = started.elapsed().as_secs_f64() * 1000.0,
            "song finished"
        );
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &MusicMetrics {
        &self.metrics
    }

    /// The validated configuration in use.
    pub fn config(&self) -> &MusicConfig {
        &self.config
    }
}
