//! Grid Tetris (workspace facade crate).
//!
//! Re-exports the member crates as `grid_tetris::{types,core,engine}` so
//! drivers and tests depend on one package while the implementation lives in
//! dedicated crates under `crates/`.

pub use grid_tetris_core as core;
pub use grid_tetris_engine as engine;
pub use grid_tetris_types as types;
