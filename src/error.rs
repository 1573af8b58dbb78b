use thiserror::Error;

use crate::components::Pos;

/// Reasons a level cannot be loaded. The core refuses to start on any of
/// these rather than running a partial level.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("level layout has no rows")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown tile code {code:?} at ({x}, {y})")]
    UnknownTile { code: char, x: usize, y: usize },

    #[error("level has no player spawn")]
    MissingSpawn,

    #[error("level has more than one player spawn")]
    DuplicateSpawn,

    #[error("{what} at {pos:?} is outside the maze")]
    OutOfBounds { what: &'static str, pos: Pos },

    #[error("{what} at {pos:?} is inside a wall")]
    Blocked { what: &'static str, pos: Pos },

    #[error("{what} at {pos:?} is on the wrong side of the pen")]
    Misplaced { what: &'static str, pos: Pos },

    #[error("level has no pellets")]
    NoPellets,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("level error: {0}")]
    Level(#[from] LevelError),
}

pub type GameResult<T> = Result<T, GameError>;
