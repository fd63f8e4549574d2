// ASCII move messages. The host sends `<row><col><connector symbol><rounds>`,
// the connector answers with `<row><col>`. Each side only ever decodes the
// other side's shape.

use std::fmt;

use crate::game::{BOARD_SIZE, Position, RoundCount, SessionConfig, Symbol};

use super::role::Role;

pub const HOST_MESSAGE_LEN: usize = 4;
pub const CONNECTOR_MESSAGE_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    WrongLength { expected: usize, found: usize },
    InvalidCoordinate(u8),
    InvalidSymbol(u8),
    InvalidRoundCount(u8),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::WrongLength { expected, found } => {
                write!(f, "Expected a {} byte message, got {} bytes", expected, found)
            }
            FramingError::InvalidCoordinate(byte) => write!(f, "Invalid coordinate byte 0x{:02x}", byte),
            FramingError::InvalidSymbol(byte) => write!(f, "Invalid symbol byte 0x{:02x}", byte),
            FramingError::InvalidRoundCount(byte) => write!(f, "Invalid round count byte 0x{:02x}", byte),
        }
    }
}

impl std::error::Error for FramingError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMessage {
    FromHost {
        position: Position,
        connector_symbol: Symbol,
        rounds: RoundCount,
    },
    FromConnector {
        position: Position,
    },
}

impl WireMessage {
    pub fn position(&self) -> Position {
        match self {
            WireMessage::FromHost { position, .. } | WireMessage::FromConnector { position } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MoveCodec {
    role: Role,
}

impl MoveCodec {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// `config` is the sender's own view; the host puts its peer's symbol on
    /// the wire.
    pub fn encode(&self, position: Position, config: &SessionConfig) -> Vec<u8> {
        match self.role {
            Role::Host => encode_host_message(position, config.remote_symbol, config.rounds).to_vec(),
            Role::Connector => encode_connector_message(position).to_vec(),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<WireMessage, FramingError> {
        match self.role {
            Role::Host => decode_connector_message(bytes),
            Role::Connector => decode_host_message(bytes),
        }
    }
}

fn encode_host_message(position: Position, connector_symbol: Symbol, rounds: RoundCount) -> [u8; HOST_MESSAGE_LEN] {
    [
        coordinate_to_wire(position.row),
        coordinate_to_wire(position.col),
        connector_symbol.to_wire(),
        rounds.to_wire(),
    ]
}

fn encode_connector_message(position: Position) -> [u8; CONNECTOR_MESSAGE_LEN] {
    [coordinate_to_wire(position.row), coordinate_to_wire(position.col)]
}

fn decode_host_message(bytes: &[u8]) -> Result<WireMessage, FramingError> {
    check_length(bytes, HOST_MESSAGE_LEN)?;

    let position = decode_position(bytes)?;
    let connector_symbol = Symbol::from_wire(bytes[2]).ok_or(FramingError::InvalidSymbol(bytes[2]))?;
    let rounds = RoundCount::from_wire(bytes[3]).ok_or(FramingError::InvalidRoundCount(bytes[3]))?;

    Ok(WireMessage::FromHost {
        position,
        connector_symbol,
        rounds,
    })
}

fn decode_connector_message(bytes: &[u8]) -> Result<WireMessage, FramingError> {
    check_length(bytes, CONNECTOR_MESSAGE_LEN)?;
    let position = decode_position(bytes)?;
    Ok(WireMessage::FromConnector { position })
}

fn check_length(bytes: &[u8], expected: usize) -> Result<(), FramingError> {
    if bytes.len() != expected {
        return Err(FramingError::WrongLength {
            expected,
            found: bytes.len(),
        });
    }
    Ok(())
}

fn decode_position(bytes: &[u8]) -> Result<Position, FramingError> {
    Ok(Position::new(
        coordinate_from_wire(bytes[0])?,
        coordinate_from_wire(bytes[1])?,
    ))
}

fn coordinate_to_wire(value: usize) -> u8 {
    b'0' + value as u8
}

fn coordinate_from_wire(byte: u8) -> Result<usize, FramingError> {
    match byte {
        b'0'..=b'9' if ((byte - b'0') as usize) < BOARD_SIZE => Ok((byte - b'0') as usize),
        _ => Err(FramingError::InvalidCoordinate(byte)),
    }
}
