use crate::game::{
    Board, GameError, Move, Position, RoundProgress, RoundRecord, SessionConfig, Turn, TurnGate,
    TournamentTracker, evaluate_move,
};
use crate::protocol::{MoveCodec, Role, WireMessage};

use super::error::{ProtocolViolation, SessionError};
use super::events::SessionEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub role: Role,
    pub config: Option<SessionConfig>,
    pub board: Board,
    pub turn: Turn,
    pub current_round: u32,
    pub wins: u32,
    pub losses: u32,
    pub history: Vec<RoundRecord>,
}

/// One side's copy of the game. Both peers feed the same ordered moves
/// through this and end up with mirrored scores.
#[derive(Debug)]
pub struct SessionState {
    role: Role,
    codec: MoveCodec,
    config: Option<SessionConfig>,
    board: Board,
    gate: TurnGate,
    tournament: Option<TournamentTracker>,
    pending_events: Vec<SessionEvent>,
}

impl SessionState {
    pub fn host(config: SessionConfig) -> Self {
        let mut state = Self::new(Role::Host);
        state.adopt_config(config);
        state
    }

    pub fn connector() -> Self {
        Self::new(Role::Connector)
    }

    fn new(role: Role) -> Self {
        Self {
            role,
            codec: MoveCodec::new(role),
            config: None,
            board: Board::new(),
            gate: TurnGate::new(role.initial_turn()),
            tournament: None,
            pending_events: Vec::new(),
        }
    }

    fn adopt_config(&mut self, config: SessionConfig) {
        self.config = Some(config);
        self.tournament = Some(TournamentTracker::new(config.local_symbol, config.rounds));
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn config(&self) -> Option<SessionConfig> {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Turn {
        self.gate.current()
    }

    /// Validates a local move and encodes it without touching any state.
    pub fn prepare_local_move(&self, row: usize, col: usize) -> Result<(Move, Vec<u8>), GameError> {
        self.gate.check_local()?;
        let config = self.config.ok_or(GameError::NotMyTurn)?;

        let position = Position::new(row, col);
        self.board.check_placeable(position)?;

        let mv = Move {
            position,
            symbol: config.local_symbol,
        };
        Ok((mv, self.codec.encode(position, &config)))
    }

    /// Applies a move previously returned by `prepare_local_move` once it has
    /// been written to the peer.
    pub fn commit_local_move(&mut self, mv: Move) -> Result<(), GameError> {
        self.gate.check_local()?;
        self.board.apply(mv)?;
        let turn = self.gate.local_moved();
        self.finish_move(mv, turn);
        Ok(())
    }

    pub fn apply_inbound(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let message = self.codec.decode(bytes)?;

        let mover = match message {
            WireMessage::FromHost {
                connector_symbol,
                rounds,
                ..
            } => {
                let received = SessionConfig::new(connector_symbol, rounds);
                match self.config {
                    None => {
                        self.adopt_config(received);
                        self.pending_events.push(SessionEvent::ConfigReceived(received));
                    }
                    Some(expected) if expected != received => {
                        return Err(ProtocolViolation::ConfigChanged {
                            expected,
                            found: received,
                        }
                        .into());
                    }
                    Some(_) => {}
                }
                received.remote_symbol
            }
            WireMessage::FromConnector { .. } => {
                self.config.ok_or(ProtocolViolation::MissingConfig)?.remote_symbol
            }
        };

        let position = message.position();
        if self.gate.is_local_turn() {
            return Err(ProtocolViolation::MoveOutOfTurn(position).into());
        }

        let mv = Move { position, symbol: mover };
        self.board
            .apply(mv)
            .map_err(|_| ProtocolViolation::CellLocked(position))?;
        let turn = self.gate.remote_moved();
        self.finish_move(mv, turn);
        Ok(())
    }

    fn finish_move(&mut self, mv: Move, turn_after_move: Turn) {
        self.pending_events.push(SessionEvent::CellMarked {
            position: mv.position,
            symbol: mv.symbol,
        });

        let outcome = evaluate_move(&self.board, mv.symbol);
        let (Some(outcome), Some(tournament)) = (outcome, self.tournament.as_mut()) else {
            self.pending_events.push(SessionEvent::TurnChanged(turn_after_move));
            return;
        };

        let progress = tournament.advance_round(outcome);
        self.board.reset();
        let turn = self.gate.reset();

        match progress {
            RoundProgress::RoundEnded { record, result } => {
                self.pending_events.push(SessionEvent::RoundEnded {
                    round_number: record.round_number,
                    result,
                });
            }
            RoundProgress::TournamentEnded(summary) => {
                self.pending_events.push(SessionEvent::TournamentEnded(summary));
            }
        }
        self.pending_events.push(SessionEvent::TurnChanged(turn));
    }

    /// Full reset after the connection is gone.
    pub fn terminate(&mut self) {
        self.board.reset();
        self.gate.reset();
        if let Some(tournament) = self.tournament.as_mut() {
            tournament.reset();
        }
        self.pending_events.clear();
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (current_round, wins, losses, history) = match &self.tournament {
            Some(t) => (t.current_round(), t.wins(), t.losses(), t.history().to_vec()),
            None => (1, 0, 0, Vec::new()),
        };

        SessionSnapshot {
            role: self.role,
            config: self.config,
            board: self.board.clone(),
            turn: self.gate.current(),
            current_round,
            wins,
            losses,
            history,
        }
    }
}
