mod board;
mod error;
mod settings;
mod tournament;
mod turn_gate;
mod types;
mod win_detector;

pub use board::Board;
pub use error::GameError;
pub use settings::{HostSetup, MAX_ROUNDS, RoundCount, SessionConfig, SetupError};
pub use tournament::{
    RoundProgress, RoundRecord, RoundResult, TournamentResult, TournamentSummary,
    TournamentTracker,
};
pub use turn_gate::{Turn, TurnGate};
pub use types::{BOARD_SIZE, Cell, Move, Position, RoundOutcome, Symbol, WinningLine};
pub use win_detector::{WinCheck, evaluate_draw, evaluate_move, evaluate_win};
