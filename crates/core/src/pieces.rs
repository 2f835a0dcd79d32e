//! Pieces module - tetromino shapes and the falling piece
//!
//! Each kind is four offsets around a pivot in its spawn orientation. Other
//! orientations are produced by quarter-turn transforms about the pivot:
//! clockwise maps (x, y) to (y, -x). O never turns. There are no wall kicks:
//! a rotation that collides fails outright.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::{Board, ClearOutcome};
use crate::error::CoreError;
use crate::types::{Direction, Occupant, PieceKind, Pos, Rotation};

/// Offset of a single block relative to the piece pivot
pub type BlockOffset = (i32, i32);

/// Shape of a piece - 4 block offsets from the pivot
pub type PieceShape = [BlockOffset; 4];

/// Spawn-orientation offsets (y up). Every shape lies in rows -1 and 0 so a
/// piece spawned with its pivot on the top row fits under the top edge.
pub fn base_shape(kind: PieceKind) -> PieceShape {
    match kind {
        PieceKind::I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
        PieceKind::O => [(0, -1), (1, -1), (0, 0), (1, 0)],
        PieceKind::T => [(0, -1), (-1, 0), (0, 0), (1, 0)],
        PieceKind::S => [(0, -1), (1, -1), (-1, 0), (0, 0)],
        PieceKind::Z => [(-1, -1), (0, -1), (0, 0), (1, 0)],
        PieceKind::J => [(-1, -1), (-1, 0), (0, 0), (1, 0)],
        PieceKind::L => [(1, -1), (-1, 0), (0, 0), (1, 0)],
    }
}

#[inline]
fn turn_cw((x, y): BlockOffset) -> BlockOffset {
    (y, -x)
}

/// Get the shape (block offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let mut shape = base_shape(kind);
    if !kind.rotates() {
        return shape;
    }
    for _ in 0..rotation.quarter_turns() {
        shape = shape.map(turn_cw);
    }
    shape
}

/// Lifecycle of a falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceState {
    Falling,
    Locked,
    GameOverTriggering,
}

/// What a successful lock did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockReport {
    pub cells: [Pos; 4],
    pub clear: ClearOutcome,
    /// Rows fallen by the hard drop that led to this lock (0 otherwise)
    pub dropped_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    Committed(LockReport),
    /// The piece had already locked or triggered game over; nothing changed.
    AlreadySettled,
}

/// The currently falling tetromino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    pivot: Pos,
    state: PieceState,
    id: u32,
}

impl Piece {
    /// Create a falling piece in spawn orientation
    pub fn new(kind: PieceKind, pivot: Pos, id: u32) -> Self {
        Self {
            kind,
            rotation: Rotation::North,
            pivot,
            state: PieceState::Falling,
            id,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn pivot(&self) -> Pos {
        self.pivot
    }

    pub fn state(&self) -> PieceState {
        self.state
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_falling(&self) -> bool {
        self.state == PieceState::Falling
    }

    /// Get the shape (block offsets) for the current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute cells for the current pivot and rotation
    pub fn cells(&self) -> [Pos; 4] {
        self.cells_at(self.pivot, self.rotation)
    }

    fn cells_at(&self, pivot: Pos, rotation: Rotation) -> [Pos; 4] {
        get_shape(self.kind, rotation).map(|(dx, dy)| pivot.offset(dx, dy))
    }

    /// Validate a candidate placement against the board
    fn check(&self, board: &Board, pivot: Pos, rotation: Rotation) -> Result<(), CoreError> {
        if board.is_clearing_rows() {
            return Err(CoreError::ConcurrentClearInProgress);
        }
        if !board.is_valid_position(&self.cells_at(pivot, rotation)) {
            return Err(CoreError::InvalidPlacement);
        }
        Ok(())
    }

    /// Check if the piece sits on the floor or a locked block
    pub fn is_grounded(&self, board: &Board) -> bool {
        let below = self.cells().map(|pos| pos.step(Direction::Down));
        !board.is_valid_position(&below)
    }

    /// Try to shift the piece one cell. Position is unchanged on failure.
    pub fn try_move(&mut self, board: &Board, direction: Direction) -> bool {
        if !self.is_falling() {
            return false;
        }
        let pivot = self.pivot.step(direction);
        match self.check(board, pivot, self.rotation) {
            Ok(()) => {
                self.pivot = pivot;
                true
            }
            Err(_) => false,
        }
    }

    /// Try a quarter turn about the pivot. O succeeds without change; any
    /// other kind keeps its prior orientation when the turn collides.
    pub fn try_rotate(&mut self, board: &Board, clockwise: bool) -> bool {
        if !self.is_falling() || board.is_clearing_rows() {
            return false;
        }
        if !self.kind.rotates() {
            return true;
        }
        let rotation = if clockwise {
            self.rotation.rotate_cw()
        } else {
            self.rotation.rotate_ccw()
        };
        match self.check(board, self.pivot, rotation) {
            Ok(()) => {
                self.rotation = rotation;
                true
            }
            Err(_) => false,
        }
    }

    /// Drop until blocked, then lock.
    pub fn hard_drop(&mut self, board: &mut Board) -> Result<LockOutcome, CoreError> {
        if !self.is_falling() {
            return Ok(LockOutcome::AlreadySettled);
        }
        if board.is_clearing_rows() {
            return Err(CoreError::ConcurrentClearInProgress);
        }

        let mut dropped_rows = 0;
        while self.try_move(board, Direction::Down) {
            dropped_rows += 1;
        }

        match self.lock(board)? {
            LockOutcome::Committed(mut report) => {
                report.dropped_rows = dropped_rows;
                Ok(LockOutcome::Committed(report))
            }
            settled => Ok(settled),
        }
    }

    /// Transfer the piece's cells into the board and clear completed rows.
    ///
    /// Idempotent: a piece that is no longer falling leaves the board alone.
    /// Rejected while the board is clearing rows; the caller retries later.
    /// A lock with any cell at or above the fatal row commits nothing and
    /// returns `FatalOverflow`.
    pub fn lock(&mut self, board: &mut Board) -> Result<LockOutcome, CoreError> {
        if !self.is_falling() {
            return Ok(LockOutcome::AlreadySettled);
        }
        if board.is_clearing_rows() {
            return Err(CoreError::ConcurrentClearInProgress);
        }

        let cells = self.cells();
        if cells.iter().any(|pos| pos.y >= board.fatal_row()) {
            debug!(
                "piece {} ({}) locked at/above fatal row {}",
                self.id,
                self.kind.as_str(),
                board.fatal_row()
            );
            self.state = PieceState::GameOverTriggering;
            return Err(CoreError::FatalOverflow);
        }

        board.commit(&cells, Occupant::new(self.kind, self.id));
        let clear = board.clear_completed_rows();
        self.state = PieceState::Locked;

        Ok(LockOutcome::Committed(LockReport {
            cells,
            clear,
            dropped_rows: 0,
        }))
    }
}
