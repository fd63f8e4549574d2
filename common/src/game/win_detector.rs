use super::board::Board;
use super::types::{BOARD_SIZE, Cell, Position, RoundOutcome, Symbol, WinningLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinCheck {
    WinForPlayer(WinningLine),
    NoWin,
}

impl WinCheck {
    pub fn is_win(&self) -> bool {
        matches!(self, WinCheck::WinForPlayer(_))
    }
}

/// Rows first, then columns, then the forward and backward diagonals.
pub fn evaluate_win(board: &Board, player: Symbol) -> WinCheck {
    check_rows(board, player)
        .or_else(|| check_columns(board, player))
        .or_else(|| check_forward_diagonal(board, player))
        .or_else(|| check_backward_diagonal(board, player))
        .map_or(WinCheck::NoWin, WinCheck::WinForPlayer)
}

pub fn evaluate_draw(board: &Board) -> bool {
    board.is_full()
}

/// Outcome of the move `mover` just made. A full board is a draw even when the
/// last mark also completed a line.
pub fn evaluate_move(board: &Board, mover: Symbol) -> Option<RoundOutcome> {
    if evaluate_draw(board) {
        return Some(RoundOutcome::Draw);
    }

    match evaluate_win(board, mover) {
        WinCheck::WinForPlayer(_) => Some(RoundOutcome::WinFor(mover)),
        WinCheck::NoWin => None,
    }
}

fn check_rows(board: &Board, player: Symbol) -> Option<WinningLine> {
    (0..BOARD_SIZE).find_map(|row| {
        check_line(
            board,
            player,
            Position::new(row, 0),
            Position::new(row, BOARD_SIZE - 1),
            |i| Position::new(row, i),
        )
    })
}

fn check_columns(board: &Board, player: Symbol) -> Option<WinningLine> {
    (0..BOARD_SIZE).find_map(|col| {
        check_line(
            board,
            player,
            Position::new(0, col),
            Position::new(BOARD_SIZE - 1, col),
            |i| Position::new(i, col),
        )
    })
}

fn check_forward_diagonal(board: &Board, player: Symbol) -> Option<WinningLine> {
    check_line(
        board,
        player,
        Position::new(0, 0),
        Position::new(BOARD_SIZE - 1, BOARD_SIZE - 1),
        |i| Position::new(i, i),
    )
}

fn check_backward_diagonal(board: &Board, player: Symbol) -> Option<WinningLine> {
    check_line(
        board,
        player,
        Position::new(0, BOARD_SIZE - 1),
        Position::new(BOARD_SIZE - 1, 0),
        |i| Position::new(i, BOARD_SIZE - 1 - i),
    )
}

fn check_line(
    board: &Board,
    player: Symbol,
    start: Position,
    end: Position,
    cell_at: impl Fn(usize) -> Position,
) -> Option<WinningLine> {
    let complete = (0..BOARD_SIZE).all(|i| board.cell(cell_at(i)) == Cell::Marked(player));
    complete.then(|| WinningLine::new(player, start, end))
}
