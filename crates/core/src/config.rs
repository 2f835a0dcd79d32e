//! Board configuration: geometry and difficulty curve.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{
    BASE_DROP_DELAY_MS, BOARD_HEIGHT, BOARD_WIDTH, DROP_DELAY_DECREASE_MS, MIN_DROP_DELAY_MS,
    ROWS_PER_DIFFICULTY_INCREASE,
};

/// Geometry and difficulty settings owned by a [`Board`](crate::Board).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    /// Row at or above which a locking piece ends the game. `None` = `height - 1`.
    pub fatal_row: Option<i32>,
    pub base_drop_delay_ms: u32,
    pub drop_delay_decrease_ms: u32,
    pub min_drop_delay_ms: u32,
    pub rows_per_difficulty_increase: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            fatal_row: None,
            base_drop_delay_ms: BASE_DROP_DELAY_MS,
            drop_delay_decrease_ms: DROP_DELAY_DECREASE_MS,
            min_drop_delay_ms: MIN_DROP_DELAY_MS,
            rows_per_difficulty_increase: ROWS_PER_DIFFICULTY_INCREASE,
        }
    }
}

impl BoardConfig {
    /// Same curve as the default, different geometry.
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn fatal_row(&self) -> i32 {
        self.fatal_row.unwrap_or(self.height - 1)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.width <= 0 {
            return Err(CoreError::InvalidConfig("board width must be positive"));
        }
        if self.height <= 0 {
            return Err(CoreError::InvalidConfig("board height must be positive"));
        }
        if let Some(row) = self.fatal_row {
            if row < 0 || row >= self.height {
                return Err(CoreError::InvalidConfig("fatal row must lie inside the board"));
            }
        }
        if self.min_drop_delay_ms == 0 {
            return Err(CoreError::InvalidConfig("minimum drop delay must be positive"));
        }
        if self.base_drop_delay_ms < self.min_drop_delay_ms {
            return Err(CoreError::InvalidConfig(
                "base drop delay must not be below the minimum",
            ));
        }
        if self.rows_per_difficulty_increase == 0 {
            return Err(CoreError::InvalidConfig(
                "rows per difficulty increase must be positive",
            ));
        }
        Ok(())
    }
}
