//! Session engine for the grid Tetris core.
//!
//! Wraps a [`core::Board`] and its falling piece in a [`Session`] that talks
//! to the collaborators (spawner, high-score store, effects, restart control)
//! and advances on explicit elapsed time.

pub use grid_tetris_core as core;
pub use grid_tetris_types as types;

pub mod config;
pub mod session;

pub use config::SessionConfig;
pub use session::{
    IntentResult, Session, SessionBuilder, SessionPhase, SessionSnapshot, TickOutcome,
};
