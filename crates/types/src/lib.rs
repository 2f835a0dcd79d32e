//! Core types module - shared data structures and constants
//!
//! This crate defines the plain data used by the board, the falling piece and
//! the session driver. Nothing here owns behaviour beyond small conversions,
//! so the types can be shared with renderers, replays and test harnesses.
//!
//! # Coordinates
//!
//! The playfield uses a y-up grid:
//!
//! - **x**: columns, `0..width`, left to right
//! - **y**: rows, `0..height`, bottom to top (row 0 is the floor)
//! - **Spawn pivot**: `(4, 19)` on the reference 10x20 board (top row)
//!
//! Pieces may extend above `height` while falling in; there is no upper bound
//! on valid positions.
//!
//! # Timing Defaults
//!
//! All durations are whole milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_DROP_DELAY_MS` | 500 | Gravity interval at difficulty 1 |
//! | `DROP_DELAY_DECREASE_MS` | 50 | Gravity speed-up per difficulty level |
//! | `MIN_DROP_DELAY_MS` | 100 | Gravity floor |
//! | `CLEAR_PAUSE_MS` | 1000 | Clear gate hold after a line clear |
//! | `RESTART_DELAY_MS` | 3000 | Delay between game over and restart |
//!
//! # Examples
//!
//! ```
//! use grid_tetris_types::{Direction, PieceKind, Pos, Rotation};
//!
//! let kind = PieceKind::from_str("t").unwrap();
//! assert_eq!(kind, PieceKind::T);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(Pos::new(4, 19).step(Direction::Down), Pos::new(4, 18));
//! ```

use serde::{Deserialize, Serialize};

/// Reference board width
pub const BOARD_WIDTH: i32 = 10;

/// Reference board height
pub const BOARD_HEIGHT: i32 = 20;

/// Spawn pivot column on the reference board
pub const SPAWN_X: i32 = 4;

/// Spawn pivot row on the reference board (the top row)
pub const SPAWN_Y: i32 = BOARD_HEIGHT - 1;

/// Gravity interval at difficulty level 1
pub const BASE_DROP_DELAY_MS: u32 = 500;

/// Gravity speed-up applied on each difficulty increase
pub const DROP_DELAY_DECREASE_MS: u32 = 50;

/// Gravity interval never drops below this
pub const MIN_DROP_DELAY_MS: u32 = 100;

/// Cumulative rows per difficulty level
pub const ROWS_PER_DIFFICULTY_INCREASE: u32 = 10;

/// How long the clear gate stays raised after rows are removed
pub const CLEAR_PAUSE_MS: u32 = 1000;

/// Delay between game over and the restart signal
pub const RESTART_DELAY_MS: u32 = 3000;

/// Intents buffered while the clear gate is raised
pub const MAX_PENDING_INTENTS: usize = 16;

/// Key under which the high score is persisted
pub const HIGH_SCORE_KEY: &str = "HighScore";

/// Line clear scoring (classic table, indexed by lines cleared)
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// Tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in the canonical I, O, T, S, Z, J, L order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Whether rotation applies to this kind (O never turns)
    pub fn rotates(&self) -> bool {
        !matches!(self, PieceKind::O)
    }
}

/// Rotation states (North = spawn orientation, East = one clockwise turn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns from North
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Some(Rotation::North),
            "east" | "e" => Some(Rotation::East),
            "south" | "s" => Some(Rotation::South),
            "west" | "w" => Some(Rotation::West),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Translation directions a falling piece can attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Unit offset (dx, dy) in board coordinates
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
        }
    }
}

/// Board coordinate (y-up)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by an arbitrary offset
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Translate one cell in the given direction
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Discrete player intents fed to the session between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    MoveLeft,
    MoveRight,
    MoveDown,
    RotateCw,
    RotateCcw,
    HardDrop,
}

impl Intent {
    /// Parse intent from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Intent::MoveLeft),
            "moveright" => Some(Intent::MoveRight),
            "movedown" => Some(Intent::MoveDown),
            "rotatecw" => Some(Intent::RotateCw),
            "rotateccw" => Some(Intent::RotateCcw),
            "harddrop" => Some(Intent::HardDrop),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::MoveLeft => "moveLeft",
            Intent::MoveRight => "moveRight",
            Intent::MoveDown => "moveDown",
            Intent::RotateCw => "rotateCw",
            Intent::RotateCcw => "rotateCcw",
            Intent::HardDrop => "hardDrop",
        }
    }
}

/// Owner of a locked cell: the colour tag (piece kind) and the spawning piece id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occupant {
    pub kind: PieceKind,
    pub piece_id: u32,
}

impl Occupant {
    pub const fn new(kind: PieceKind, piece_id: u32) -> Self {
        Self { kind, piece_id }
    }
}

/// Cell on the board (None = empty, Some = locked occupant)
pub type Cell = Option<Occupant>;
