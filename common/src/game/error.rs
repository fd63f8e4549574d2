use std::fmt;

use super::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    NotMyTurn,
    CellLocked(Position),
    OutOfBounds { row: usize, col: usize },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NotMyTurn => write!(f, "It is the opponent's turn"),
            GameError::CellLocked(position) => write!(f, "Cell {} is already marked", position),
            GameError::OutOfBounds { row, col } => {
                write!(f, "Position ({}, {}) is outside the board", row, col)
            }
        }
    }
}

impl std::error::Error for GameError {}
