//! Board module - owns the occupancy grid and the score/difficulty state
//!
//! The board is a `width x height` grid where each cell is empty or holds the
//! occupant of a locked piece. Storage is a flat row-major vector.
//! Coordinates: (x, y) with x in `0..width` (left to right) and y in
//! `0..height` (bottom to top). Positions above the top row are legal for a
//! falling piece but are never stored.

use log::{debug, info};

use crate::collab::HighScoreStore;
use crate::config::BoardConfig;
use crate::error::CoreError;
use crate::scoring::{calculate_score, Difficulty};
use crate::snapshot::BoardSnapshot;
use crate::types::{Cell, Occupant, Pos};

/// Result of one `clear_completed_rows` evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Row index passed to each `clear_row` call, in call order.
    /// An index repeats when a row that shifted down was full as well.
    pub rows: Vec<i32>,
    pub points: u32,
    pub difficulty_increased: bool,
}

impl ClearOutcome {
    pub fn lines(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of `Board::game_over`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub score: u32,
    pub previous_high: u32,
    pub new_high: bool,
}

/// The game board with its scoring state
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    config: BoardConfig,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
    rows_cleared: u32,
    score: u32,
    difficulty: Difficulty,
    /// Remaining presentation pause; the clear gate is raised while non-zero.
    clear_pause_ms: u32,
}

impl Board {
    /// Create an empty reference 10x20 board
    pub fn new() -> Self {
        Self::from_valid_config(BoardConfig::default())
    }

    /// Create an empty board from a configuration
    pub fn with_config(config: BoardConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: BoardConfig) -> Self {
        let size = (config.width * config.height) as usize;
        let difficulty = Difficulty::new(&config);
        Self {
            config,
            cells: vec![None; size],
            rows_cleared: 0,
            score: 0,
            difficulty,
            clear_pause_ms: 0,
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.config.width || y < 0 || y >= self.config.height {
            return None;
        }
        Some((y as usize) * (self.config.width as usize) + (x as usize))
    }

    pub fn width(&self) -> i32 {
        self.config.width
    }

    pub fn height(&self) -> i32 {
        self.config.height
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Row at or above which a lock ends the game
    pub fn fatal_row(&self) -> i32 {
        self.config.fatal_row()
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check whether a single cell may hold a falling block.
    /// Cells above the top row are free; sides and floor are not.
    pub fn is_free(&self, pos: Pos) -> bool {
        if pos.x < 0 || pos.x >= self.config.width || pos.y < 0 {
            return false;
        }
        !self.is_occupied(pos.x, pos.y)
    }

    /// Check that every candidate cell is inside the walls, above the floor
    /// and unoccupied
    pub fn is_valid_position(&self, candidate: &[Pos]) -> bool {
        candidate.iter().all(|&pos| self.is_free(pos))
    }

    /// Mark cells as occupied by `occupant`. Cells at or above the top row
    /// are skipped.
    pub fn commit(&mut self, cells: &[Pos], occupant: Occupant) {
        for &pos in cells {
            if pos.y >= self.config.height {
                continue;
            }
            if self.set(pos.x, pos.y, Some(occupant)) {
                debug!(
                    "block {} (piece {}) locked at ({}, {})",
                    occupant.kind.as_str(),
                    occupant.piece_id,
                    pos.x,
                    pos.y
                );
            }
        }
    }

    fn row(&self, y: i32) -> Option<&[Cell]> {
        if y < 0 || y >= self.config.height {
            return None;
        }
        let width = self.config.width as usize;
        let start = y as usize * width;
        Some(&self.cells[start..start + width])
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: i32) -> bool {
        self.row(y)
            .map(|row| row.iter().all(|cell| cell.is_some()))
            .unwrap_or(false)
    }

    /// Check if a row has no occupied cell (rows outside the board are empty)
    pub fn is_row_empty(&self, y: i32) -> bool {
        self.row(y)
            .map(|row| row.iter().all(|cell| cell.is_none()))
            .unwrap_or(true)
    }

    /// Empty row `y`, shift every row above it down by one and empty the top
    /// row. Returns false (and does nothing) for rows outside the board.
    pub fn clear_row(&mut self, y: i32) -> bool {
        if y < 0 || y >= self.config.height {
            return false;
        }

        debug!("clearing row {}", y);

        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let y = y as usize;

        // Row y' takes the contents of y' + 1 for y' in y..height-1.
        // copy_within handles the overlapping ranges.
        if y + 1 < height {
            self.cells
                .copy_within((y + 1) * width..height * width, y * width);
        }

        // Clear the top row
        let top_start = (height - 1) * width;
        for cell in &mut self.cells[top_start..] {
            *cell = None;
        }

        true
    }

    /// Clear every full row, score them once in aggregate and advance
    /// difficulty.
    ///
    /// Rows are scanned from the top index down to 0. After a clear the same
    /// index is examined again because the row above has moved into it.
    pub fn clear_completed_rows(&mut self) -> ClearOutcome {
        let mut outcome = ClearOutcome::default();

        let mut y = self.config.height - 1;
        while y >= 0 {
            if self.is_row_full(y) {
                self.clear_row(y);
                outcome.rows.push(y);
                // Re-examine the same index
                continue;
            }
            y -= 1;
        }

        let lines = outcome.lines();
        if lines == 0 {
            return outcome;
        }

        outcome.points = calculate_score(lines, self.difficulty.score_level());
        self.score = self.score.saturating_add(outcome.points);
        self.rows_cleared = self.rows_cleared.saturating_add(lines as u32);
        outcome.difficulty_increased = self.maybe_increase_difficulty();

        debug!(
            "cleared {} row(s) for {} points (score {}, rows {})",
            lines, outcome.points, self.score, self.rows_cleared
        );

        outcome
    }

    /// Raise difficulty once if the cumulative rows cleared reached the next
    /// threshold. Returns true when the level went up.
    pub fn maybe_increase_difficulty(&mut self) -> bool {
        let increased = self
            .difficulty
            .maybe_increase(self.rows_cleared, &self.config);
        if increased {
            info!(
                "difficulty increased to {} (drop delay {}ms)",
                self.difficulty.level(),
                self.difficulty.drop_delay_ms()
            );
        }
        increased
    }

    /// Raise the clear gate for a presentation pause.
    pub fn begin_clear_pause(&mut self, duration_ms: u32) {
        self.clear_pause_ms = self.clear_pause_ms.max(duration_ms);
    }

    /// Count the clear pause down. Returns true when this call released the gate.
    pub fn advance_clear_pause(&mut self, elapsed_ms: u32) -> bool {
        if self.clear_pause_ms == 0 {
            return false;
        }
        self.clear_pause_ms = self.clear_pause_ms.saturating_sub(elapsed_ms);
        self.clear_pause_ms == 0
    }

    /// Whether rows are being cleared (no move, lock or spawn may happen)
    pub fn is_clearing_rows(&self) -> bool {
        self.clear_pause_ms > 0
    }

    /// Remaining clear pause
    pub fn clear_pause_ms(&self) -> u32 {
        self.clear_pause_ms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rows_cleared(&self) -> u32 {
        self.rows_cleared
    }

    pub fn difficulty_level(&self) -> u32 {
        self.difficulty.level()
    }

    /// Current gravity interval
    pub fn drop_delay_ms(&self) -> u32 {
        self.difficulty.drop_delay_ms()
    }

    /// End the game: persist a new high score and wipe the stack.
    pub fn game_over(&mut self, store: &mut dyn HighScoreStore) -> GameOverReport {
        let previous_high = store.read_high_score();
        let new_high = self.score > previous_high;
        if new_high {
            info!("new high score {} (previous {})", self.score, previous_high);
            store.write_high_score(self.score);
        }

        self.clear();
        self.clear_pause_ms = 0;

        GameOverReport {
            score: self.score,
            previous_high,
            new_high,
        }
    }

    /// Restore the initial state: empty grid, zero score, level 1.
    pub fn reset(&mut self) {
        self.clear();
        self.rows_cleared = 0;
        self.score = 0;
        self.difficulty = Difficulty::new(&self.config);
        self.clear_pause_ms = 0;
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Clear the entire grid (counters untouched)
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let width = self.config.width as usize;
        BoardSnapshot {
            width: self.config.width,
            height: self.config.height,
            rows: self
                .cells
                .chunks(width)
                .map(|row| row.iter().map(|cell| cell.map(|o| o.kind)).collect())
                .collect(),
            score: self.score,
            rows_cleared: self.rows_cleared,
            difficulty_level: self.difficulty.level(),
            drop_delay_ms: self.difficulty.drop_delay_ms(),
            clearing_rows: self.is_clearing_rows(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
