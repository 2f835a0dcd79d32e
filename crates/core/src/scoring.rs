//! Scoring module - classic line-clear table and difficulty progression
//!
//! Points are awarded once per clear evaluation, for the aggregate number of
//! rows removed, scaled by a 0-based level (`difficulty_level - 1`).
//! Difficulty rises one step each time the cumulative rows cleared reach the
//! next multiple of `rows_per_difficulty_increase`, shortening gravity.

use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;
use crate::types::LINE_SCORES;

/// Calculate line clear score (classic rules)
/// lines: number of lines cleared together (1-4 score, anything else is 0)
/// level: 0-based level
pub fn calculate_score(lines: usize, level: u32) -> u32 {
    if lines == 0 || lines > 4 {
        return 0;
    }
    LINE_SCORES[lines].saturating_mul(level.saturating_add(1))
}

/// Difficulty tier and the gravity interval it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    level: u32,
    drop_delay_ms: u32,
}

impl Difficulty {
    /// Level 1 at the configured base drop delay
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            level: 1,
            drop_delay_ms: config.base_drop_delay_ms,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn drop_delay_ms(&self) -> u32 {
        self.drop_delay_ms
    }

    /// 0-based level used by the score table
    pub fn score_level(&self) -> u32 {
        self.level.saturating_sub(1)
    }

    /// Raise the level once if `rows_cleared` has reached the next threshold.
    /// Returns true when the level went up.
    pub fn maybe_increase(&mut self, rows_cleared: u32, config: &BoardConfig) -> bool {
        if rows_cleared / config.rows_per_difficulty_increase < self.level {
            return false;
        }
        self.level += 1;
        self.drop_delay_ms = self
            .drop_delay_ms
            .saturating_sub(config.drop_delay_decrease_ms)
            .max(config.min_drop_delay_ms);
        true
    }
}
