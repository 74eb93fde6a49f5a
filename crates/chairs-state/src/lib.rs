//! Game state for musical chairs.
//!
//! This crate is the leaf of the workspace. It knows nothing about tasks,
//! semaphores, or timers, only the bookkeeping that every actor shares:
//!
//! - **Types** ([`PlayerId`], [`SeatOutcome`], [`GameEvent`],
//!   [`GameOutcome`]): the vocabulary the actors and observers speak.
//! - **State** ([`GameState`]): round and player counters, the seat
//!   counter with its sentinel.
//! - **Config** ([`GameConfig`]): the starting player count.
//! - **Errors** ([`StateError`]): invariant violations.
//!
//! # Architecture
//!
//! ```text
//! Session (actors + sync primitives) → State (counters under a lock)
//! ```
//!
//! The session layer wraps [`GameState`] in a mutex; every method here
//! assumes the caller already holds it.

mod config;
mod error;
mod state;
mod types;

pub use config::GameConfig;
pub use error::StateError;
pub use state::{GameState, SEAT_SENTINEL};
pub use types::{GameEvent, GameOutcome, PlayerId, SeatOutcome};
