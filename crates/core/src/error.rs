//! Error taxonomy for placement, locking and session wiring.
//!
//! Geometry failures never escape as panics: `try_move` and `try_rotate`
//! report them as `false`, and only lock/build paths surface a `CoreError`
//! so the caller can choose to retry, end the game or abort construction.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Candidate cells are out of bounds or overlap locked cells.
    InvalidPlacement,
    /// A move or lock was attempted while the clear gate is raised.
    ConcurrentClearInProgress,
    /// A lock would leave a cell at or above the fatal row.
    FatalOverflow,
    /// A required collaborator was not supplied at session build time.
    MissingCollaborator(&'static str),
    /// Configuration rejected by validation.
    InvalidConfig(&'static str),
}

impl CoreError {
    pub fn code(self) -> &'static str {
        match self {
            CoreError::InvalidPlacement => "invalid_placement",
            CoreError::ConcurrentClearInProgress => "clear_in_progress",
            CoreError::FatalOverflow => "fatal_overflow",
            CoreError::MissingCollaborator(_) => "missing_collaborator",
            CoreError::InvalidConfig(_) => "invalid_config",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            CoreError::InvalidPlacement => "candidate cells are out of bounds or occupied",
            CoreError::ConcurrentClearInProgress => "rows are being cleared; retry on a later tick",
            CoreError::FatalOverflow => "piece locked at or above the fatal row",
            CoreError::MissingCollaborator(name) => name,
            CoreError::InvalidConfig(reason) => reason,
        }
    }

    /// Whether the session can carry on after this error.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            CoreError::InvalidPlacement | CoreError::ConcurrentClearInProgress
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::MissingCollaborator(name) => {
                write!(f, "{}: missing collaborator `{}`", self.code(), name)
            }
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for CoreError {}
