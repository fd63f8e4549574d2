use std::fmt;
use std::io;

use crate::game::{GameError, Position, SessionConfig, SetupError};
use crate::protocol::FramingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    MoveOutOfTurn(Position),
    CellLocked(Position),
    ConfigChanged {
        expected: SessionConfig,
        found: SessionConfig,
    },
    MissingConfig,
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolViolation::MoveOutOfTurn(position) => {
                write!(f, "Peer moved at {} while it was not their turn", position)
            }
            ProtocolViolation::CellLocked(position) => {
                write!(f, "Peer marked locked cell {}", position)
            }
            ProtocolViolation::ConfigChanged { expected, found } => write!(
                f,
                "Peer changed the session config from {}/{} rounds to {}/{} rounds",
                expected.local_symbol, expected.rounds, found.local_symbol, found.rounds
            ),
            ProtocolViolation::MissingConfig => write!(f, "Move received before any session config"),
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    Connection(io::Error),
    Setup(SetupError),
    Game(GameError),
    Framing(FramingError),
    Protocol(ProtocolViolation),
    NotConnected,
}

impl SessionError {
    /// Local rejections leave the session running; everything else ends it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SessionError::Game(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Connection(e) => write!(f, "Connection error: {}", e),
            SessionError::Setup(e) => write!(f, "Setup error: {}", e),
            SessionError::Game(e) => write!(f, "Move rejected: {}", e),
            SessionError::Framing(e) => write!(f, "Framing error: {}", e),
            SessionError::Protocol(e) => write!(f, "Protocol violation: {}", e),
            SessionError::NotConnected => write!(f, "Session is not connected"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Connection(e) => Some(e),
            SessionError::Setup(e) => Some(e),
            SessionError::Game(e) => Some(e),
            SessionError::Framing(e) => Some(e),
            SessionError::Protocol(_) | SessionError::NotConnected => None,
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        SessionError::Connection(e)
    }
}

impl From<SetupError> for SessionError {
    fn from(e: SetupError) -> Self {
        SessionError::Setup(e)
    }
}

impl From<GameError> for SessionError {
    fn from(e: GameError) -> Self {
        SessionError::Game(e)
    }
}

impl From<FramingError> for SessionError {
    fn from(e: FramingError) -> Self {
        SessionError::Framing(e)
    }
}

impl From<ProtocolViolation> for SessionError {
    fn from(e: ProtocolViolation) -> Self {
        SessionError::Protocol(e)
    }
}
