//! Session configuration
//!
//! Defaults reproduce the reference game. Values can be overridden from
//! `TETRIS_*` environment variables or loaded from a JSON document where any
//! missing field keeps its default.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::{get_shape, BoardConfig, CoreError};
use crate::types::{
    PieceKind, Pos, Rotation, CLEAR_PAUSE_MS, MAX_PENDING_INTENTS, RESTART_DELAY_MS,
};

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub board: BoardConfig,
    /// Spawn pivot column. `None` = `width / 2 - 1`.
    pub spawn_x: Option<i32>,
    /// Spawn pivot row. `None` = the top row.
    pub spawn_y: Option<i32>,
    /// Clear gate hold after rows are removed
    pub clear_pause_ms: u32,
    /// Delay between game over and the restart signal
    pub restart_delay_ms: u32,
    /// Intents buffered while the clear gate is raised (at most `MAX_PENDING_INTENTS`)
    pub max_pending_intents: usize,
    /// Seed for the built-in spawners
    pub seed: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            spawn_x: None,
            spawn_y: None,
            clear_pause_ms: CLEAR_PAUSE_MS,
            restart_delay_ms: RESTART_DELAY_MS,
            max_pending_intents: MAX_PENDING_INTENTS,
            seed: 1,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring unparsable {}={:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl SessionConfig {
    /// Defaults overridden by `TETRIS_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let board = BoardConfig {
            width: env_or("TETRIS_BOARD_WIDTH", defaults.board.width),
            height: env_or("TETRIS_BOARD_HEIGHT", defaults.board.height),
            fatal_row: defaults.board.fatal_row,
            base_drop_delay_ms: env_or("TETRIS_BASE_DROP_MS", defaults.board.base_drop_delay_ms),
            drop_delay_decrease_ms: env_or(
                "TETRIS_DROP_DECREASE_MS",
                defaults.board.drop_delay_decrease_ms,
            ),
            min_drop_delay_ms: env_or("TETRIS_MIN_DROP_MS", defaults.board.min_drop_delay_ms),
            rows_per_difficulty_increase: env_or(
                "TETRIS_ROWS_PER_LEVEL",
                defaults.board.rows_per_difficulty_increase,
            ),
        };

        Self {
            board,
            clear_pause_ms: env_or("TETRIS_CLEAR_PAUSE_MS", defaults.clear_pause_ms),
            restart_delay_ms: env_or("TETRIS_RESTART_DELAY_MS", defaults.restart_delay_ms),
            max_pending_intents: env_or("TETRIS_MAX_PENDING", defaults.max_pending_intents),
            seed: env_or("TETRIS_SEED", defaults.seed),
            ..defaults
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing session config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading session config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("loading {}", path.display()))
    }

    /// Spawn pivot for new pieces
    pub fn spawn(&self) -> Pos {
        Pos::new(
            self.spawn_x.unwrap_or(self.board.width / 2 - 1),
            self.spawn_y.unwrap_or(self.board.height - 1),
        )
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.board.validate()?;
        // Every kind must spawn clear of the walls and the floor
        let spawn = self.spawn();
        let fits = PieceKind::ALL.iter().all(|&kind| {
            get_shape(kind, Rotation::North).iter().all(|&(dx, dy)| {
                let cell = spawn.offset(dx, dy);
                cell.x >= 0 && cell.x < self.board.width && cell.y >= 0
            })
        });
        if !fits {
            return Err(CoreError::InvalidConfig("every piece must fit at the spawn pivot"));
        }
        if self.max_pending_intents > MAX_PENDING_INTENTS {
            return Err(CoreError::InvalidConfig("too many pending intents requested"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spawn_is_top_center() {
        let config = SessionConfig::default();
        assert_eq!(config.spawn(), Pos::new(4, 19));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_spawn_follows_board_size() {
        let config = SessionConfig {
            board: BoardConfig::with_size(6, 12),
            ..SessionConfig::default()
        };
        assert_eq!(config.spawn(), Pos::new(2, 11));
    }

    #[test]
    fn test_json_overrides_nested_fields() {
        let config = SessionConfig::from_json_str(
            r#"{"board": {"height": 24}, "restart_delay_ms": 0}"#,
        )
        .unwrap();
        assert_eq!(config.board.height, 24);
        assert_eq!(config.board.width, 10);
        assert_eq!(config.restart_delay_ms, 0);
        assert_eq!(config.spawn(), Pos::new(4, 23));
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let err = SessionConfig::from_json_str(r#"{"max_pending_intents": 99}"#).unwrap_err();
        assert!(err.to_string().contains("too many pending intents"));
        assert!(SessionConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = SessionConfig::from_json_file("/nonexistent/session.json").unwrap_err();
        assert!(format!("{:#}", err).contains("reading session config"));
    }

    #[test]
    fn test_spawn_outside_board_is_rejected() {
        let config = SessionConfig {
            spawn_x: Some(10),
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(CoreError::InvalidConfig("every piece must fit at the spawn pivot"))
        );
    }

    #[test]
    fn test_spawn_must_fit_every_shape() {
        let with_spawn = |x, y| SessionConfig {
            spawn_x: Some(x),
            spawn_y: Some(y),
            ..SessionConfig::default()
        };
        // I reaches two columns right and one left of the pivot
        assert!(with_spawn(8, 19).validate().is_err());
        assert!(with_spawn(0, 19).validate().is_err());
        assert!(with_spawn(7, 19).validate().is_ok());
        assert!(with_spawn(1, 19).validate().is_ok());
        // Lower cells sit one row under the pivot
        assert!(with_spawn(4, 0).validate().is_err());
        assert!(with_spawn(4, 1).validate().is_ok());
    }

    #[test]
    fn test_narrow_board_is_rejected() {
        let config = SessionConfig {
            board: BoardConfig::with_size(3, 20),
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(CoreError::InvalidConfig("every piece must fit at the spawn pivot"))
        );

        let config = SessionConfig {
            board: BoardConfig::with_size(4, 20),
            ..SessionConfig::default()
        };
        assert_eq!(config.spawn(), Pos::new(1, 19));
        assert_eq!(config.validate(), Ok(()));
    }
}
