//! Collaborator contracts: everything the core notifies or queries but does
//! not implement (piece supply, high-score persistence, presentation, scene
//! restart).

use std::collections::HashMap;

use log::info;

use crate::pieces::Piece;
use crate::types::{Pos, HIGH_SCORE_KEY};

/// Supplies the next falling piece.
pub trait Spawner {
    /// Produce a falling piece at the spawn coordinate, rotation North.
    /// `id` is the session's spawn sequence number for the new piece.
    fn spawn_next(&mut self, id: u32) -> Piece;
}

/// Persisted high score, read at session start and written on game over.
pub trait HighScoreStore {
    /// Saved high score, 0 when nothing has been saved.
    fn read_high_score(&self) -> u32;
    fn write_high_score(&mut self, score: u32);
}

/// Presentation hooks. Purely informational: core behaviour never waits on
/// them.
pub trait EffectsSink {
    fn on_row_cleared(&mut self, _row: i32) {}
    fn on_lines_cleared(&mut self, _count: usize) {}
    fn on_piece_locked(&mut self, _cells: &[Pos]) {}
    fn on_difficulty_increased(&mut self, _level: u32) {}
    fn on_hard_drop(&mut self, _rows: u32) {}
    fn on_game_over(&mut self) {}
}

/// Scene/session manager that performs the actual restart.
pub trait SessionControl {
    fn restart_session(&mut self);
}

/// Key-value high-score store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    key: String,
    values: HashMap<String, u32>,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::with_key(HIGH_SCORE_KEY)
    }

    pub fn with_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            values: HashMap::new(),
        }
    }

    /// Store pre-seeded with a saved score
    pub fn with_score(score: u32) -> Self {
        let mut store = Self::new();
        store.write_high_score(score);
        store
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn read_high_score(&self) -> u32 {
        self.values.get(&self.key).copied().unwrap_or(0)
    }

    fn write_high_score(&mut self, score: u32) {
        self.values.insert(self.key.clone(), score);
    }
}

/// Effects sink that reports every event through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEffects;

impl EffectsSink for LogEffects {
    fn on_row_cleared(&mut self, row: i32) {
        info!(target: "effects", "row {} cleared", row);
    }

    fn on_lines_cleared(&mut self, count: usize) {
        info!(target: "effects", "{} line(s) cleared", count);
    }

    fn on_piece_locked(&mut self, cells: &[Pos]) {
        info!(target: "effects", "piece locked at {:?}", cells);
    }

    fn on_difficulty_increased(&mut self, level: u32) {
        info!(target: "effects", "difficulty {}", level);
    }

    fn on_hard_drop(&mut self, rows: u32) {
        info!(target: "effects", "hard drop over {} row(s)", rows);
    }

    fn on_game_over(&mut self) {
        info!(target: "effects", "game over");
    }
}

/// Restart control that only records the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopControl {
    restarts: u32,
}

impl NoopControl {
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl SessionControl for NoopControl {
    fn restart_session(&mut self) {
        self.restarts += 1;
        info!("session restart requested ({})", self.restarts);
    }
}
