//! # Chairs
//!
//! Concurrent musical chairs. N player tasks race for N−1 chairs each
//! round; a referee task stops the music, lets the loser discover it has no
//! chair, and starts the next round until one player is left.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chairs::prelude::*;
//!
//! # async fn demo() -> Result<(), ChairsError> {
//! let report = MusicalChairs::builder()
//!     .players(4)
//!     .build()?
//!     .run()
//!     .await?;
//! println!("{} wins", report.outcome.winner);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;

pub use builder::{GameBuilder, MusicalChairs};
pub use error::ChairsError;

pub use chairs_music::{MusicConfig, MusicMetrics};
pub use chairs_session::{EventSender, GameReport, PlayerReport, SessionError};
pub use chairs_state::{GameConfig, GameEvent, GameOutcome, PlayerId, StateError};

pub mod prelude {
    pub use crate::{
        ChairsError, GameBuilder, GameConfig, GameEvent, GameOutcome, GameReport, MusicConfig,
        MusicalChairs, PlayerId,
    };
}
