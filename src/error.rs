/// Errors raised by the maze core.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeError {
    /// Grid too small to hold a border plus one interior cell.
    #[error("invalid maze dimensions {width}x{height}: both sides must be at least 3")]
    InvalidDimensions { width: usize, height: usize },
}

pub type MazeResult<T> = Result<T, MazeError>;
