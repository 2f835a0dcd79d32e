//! Core game logic - the board, the falling piece and their rules
//!
//! Pure and deterministic: no rendering, input, audio or storage lives here.
//! Everything outside the rules is reached through the collaborator traits in
//! [`collab`].
//!
//! # Module Structure
//!
//! - [`board`]: occupancy grid, placement checks, cascading line clears,
//!   score, difficulty and the clear gate
//! - [`pieces`]: tetromino shapes and the falling [`Piece`]
//! - [`scoring`]: classic score table and difficulty progression
//! - [`collab`]: spawner, high-score store, effects sink and restart contracts
//! - [`rng`]: deterministic spawners (uniform, 7-bag, fixed sequence)
//! - [`config`]: board geometry and difficulty curve
//! - [`error`]: [`CoreError`] taxonomy
//! - [`snapshot`]: serialisable views
//!
//! # Rules
//!
//! - No wall kicks: a rotation that collides fails and the piece keeps its
//!   orientation. O never rotates.
//! - Full rows are removed in one evaluation and scored once in aggregate at
//!   the 0-based level (`difficulty_level - 1`).
//! - Every `rows_per_difficulty_increase` cumulative rows raise the level by
//!   one and shorten gravity down to a floor.
//! - A lock with any block at or above the fatal row ends the game.
//!
//! # Example
//!
//! ```
//! use grid_tetris_core::{Board, LockOutcome, Piece};
//! use grid_tetris_core::types::{Direction, PieceKind, Pos};
//!
//! let mut board = Board::new();
//! let mut piece = Piece::new(PieceKind::I, Pos::new(4, 19), 1);
//!
//! assert!(piece.try_move(&board, Direction::Left));
//! let outcome = piece.hard_drop(&mut board).unwrap();
//! assert!(matches!(outcome, LockOutcome::Committed(_)));
//! assert_eq!(board.occupied_count(), 4);
//! assert!(!board.is_row_full(0));
//! ```

pub mod board;
pub mod collab;
pub mod config;
pub mod error;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use grid_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, ClearOutcome, GameOverReport};
pub use collab::{
    EffectsSink, HighScoreStore, LogEffects, MemoryHighScoreStore, NoopControl, SessionControl,
    Spawner,
};
pub use config::BoardConfig;
pub use error::CoreError;
pub use pieces::{get_shape, LockOutcome, LockReport, Piece, PieceState};
pub use rng::{BagSpawner, SequenceSpawner, SimpleRng, UniformSpawner};
pub use scoring::{calculate_score, Difficulty};
pub use snapshot::{BoardSnapshot, PieceSnapshot};
