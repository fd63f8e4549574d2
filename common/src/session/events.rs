use crate::game::{
    GameError, Position, RoundResult, SessionConfig, Symbol, TournamentSummary, Turn,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingConnection,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    CellMarked {
        position: Position,
        symbol: Symbol,
    },
    TurnChanged(Turn),
    RoundEnded {
        round_number: u32,
        result: RoundResult,
    },
    TournamentEnded(TournamentSummary),
    ConnectionStateChanged(ConnectionState),
    ConfigReceived(SessionConfig),
    MoveRejected(GameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationCommand {
    RequestMove { row: usize, col: usize },
    Disconnect,
}
