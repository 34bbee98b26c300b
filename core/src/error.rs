use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates are outside the grid")]
    OutOfBounds,
    #[error("No empty cell left to spawn a tile into")]
    NoEmptyCell,
    #[error("Unrecognized direction")]
    InvalidDirection,
    #[error("Grid size or start tile count out of range")]
    InvalidSize,
    #[error("Tile values must be a power of two, at least 2")]
    InvalidValue,
    #[error("Cell already holds a tile")]
    CellOccupied,
    #[error("Board shape does not match its cells")]
    InvalidBoardShape,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
