//! Referee and player actors for musical chairs.
//!
//! Each player and the referee run as independent Tokio tasks. They share
//! one [`GameSession`] that owns every synchronization primitive:
//!
//! - **Seat permits**: a counting semaphore, one permit per chair.
//! - **Music**: a watch channel carrying the [`MusicPhase`]; flipping it to
//!   `Stopped` releases every waiting player at once.
//! - **Round barrier**: a zero-permit semaphore the referee waits on until
//!   the loser has left.
//! - **Game active**: the cancellation flag.
//!
//! # How it fits together
//!
//! ```text
//! Referee: play ──→ stop ──→ +1 permit ──→ wait barrier ──→ next round / end
//!                     │                         ↑
//! Players:  wait ─────┘──→ acquire ──→ seat? ───┘ (loser signals barrier)
//! ```
//!
//! [`spawn_game`] wires it all up and returns a [`GameHandle`].

mod error;
mod game;
mod player;
mod referee;
mod session;

pub use error::SessionError;
pub use game::{GameHandle, GameReport, run_game, spawn_game};
pub use player::{PlayerReport, PlayerState};
pub use referee::{RefereeReport, RefereeState};
pub use session::{EventSender, GameSession, MusicCue, MusicPhase};
