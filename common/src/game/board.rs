use super::error::GameError;
use super::types::{BOARD_SIZE, Cell, Move, Position, Symbol};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
    locked: [[bool; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from three rows of `X`, `O` and `.` characters, applying
    /// every mark in row-major order.
    pub fn from_pattern(rows: [&str; BOARD_SIZE]) -> Result<Self, String> {
        let mut board = Self::new();
        for (row, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            if chars.len() != BOARD_SIZE {
                return Err(format!("Row {} must have {} cells, got '{}'", row, BOARD_SIZE, line));
            }
            for (col, ch) in chars.into_iter().enumerate() {
                let symbol = match ch {
                    'X' => Symbol::X,
                    'O' => Symbol::O,
                    '.' => continue,
                    other => return Err(format!("Unexpected cell '{}' at ({}, {})", other, row, col)),
                };
                board
                    .apply(Move::new(row, col, symbol))
                    .map_err(|e| e.to_string())?;
            }
        }
        Ok(board)
    }

    pub fn cell(&self, position: Position) -> Cell {
        self.cells[position.row][position.col]
    }

    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn is_locked(&self, position: Position) -> bool {
        self.locked[position.row][position.col]
    }

    pub fn check_placeable(&self, position: Position) -> Result<(), GameError> {
        if !position.is_on_board() {
            return Err(GameError::OutOfBounds {
                row: position.row,
                col: position.col,
            });
        }
        if self.is_locked(position) {
            return Err(GameError::CellLocked(position));
        }
        Ok(())
    }

    pub fn apply(&mut self, mv: Move) -> Result<(), GameError> {
        self.check_placeable(mv.position)?;

        let Position { row, col } = mv.position;
        self.cells[row][col] = Cell::Marked(mv.symbol);
        self.locked[row][col] = true;
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|&cell| cell != Cell::Empty))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
