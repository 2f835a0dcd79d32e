//! Serialisable views of the board and the falling piece.

use serde::{Deserialize, Serialize};

use crate::pieces::{Piece, PieceState};
use crate::types::{PieceKind, Pos, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceSnapshot {
    pub id: u32,
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub pivot: Pos,
    pub cells: [Pos; 4],
    pub state: PieceState,
}

impl From<&Piece> for PieceSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            id: value.id(),
            kind: value.kind(),
            rotation: value.rotation(),
            pivot: value.pivot(),
            cells: value.cells(),
            state: value.state(),
        }
    }
}

/// Board contents and counters. `rows[0]` is the bottom row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    pub rows: Vec<Vec<Option<PieceKind>>>,
    pub score: u32,
    pub rows_cleared: u32,
    pub difficulty_level: u32,
    pub drop_delay_ms: u32,
    pub clearing_rows: bool,
}

impl BoardSnapshot {
    /// Render the grid top row first, `.` for empty cells
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.rows.len() * (self.width as usize + 1));
        for row in self.rows.iter().rev() {
            for cell in row {
                out.push_str(cell.map(|k| k.as_str()).unwrap_or("."));
            }
            out.push('\n');
        }
        out
    }
}
