use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::Symbol;

/// Rounds travel as a single ASCII digit, which caps a tournament at nine.
pub const MAX_ROUNDS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    InvalidRoundCount(i64),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::InvalidRoundCount(rounds) if *rounds <= 0 => {
                write!(f, "Round count must be positive, got {}", rounds)
            }
            SetupError::InvalidRoundCount(rounds) if *rounds % 2 == 0 => {
                write!(f, "Round count must be odd, got {}", rounds)
            }
            SetupError::InvalidRoundCount(rounds) => {
                write!(f, "Round count must not exceed {}, got {}", MAX_ROUNDS, rounds)
            }
        }
    }
}

impl std::error::Error for SetupError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundCount(u32);

impl RoundCount {
    pub fn new(rounds: i64) -> Result<Self, SetupError> {
        if rounds <= 0 || rounds % 2 == 0 || rounds > MAX_ROUNDS as i64 {
            return Err(SetupError::InvalidRoundCount(rounds));
        }
        Ok(Self(rounds as u32))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn majority(&self) -> u32 {
        self.0.div_ceil(2)
    }

    pub fn to_wire(&self) -> u8 {
        b'0' + self.0 as u8
    }

    pub fn from_wire(byte: u8) -> Option<Self> {
        if !byte.is_ascii_digit() {
            return None;
        }
        Self::new((byte - b'0') as i64).ok()
    }
}

impl fmt::Display for RoundCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub local_symbol: Symbol,
    pub remote_symbol: Symbol,
    pub rounds: RoundCount,
}

impl SessionConfig {
    pub fn new(local_symbol: Symbol, rounds: RoundCount) -> Self {
        Self {
            local_symbol,
            remote_symbol: local_symbol.opponent(),
            rounds,
        }
    }
}

/// What the host's setup step collects before any socket is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSetup {
    pub local_symbol: Symbol,
    pub rounds: i64,
}

impl HostSetup {
    pub fn new(local_symbol: Symbol, rounds: i64) -> Self {
        Self {
            local_symbol,
            rounds,
        }
    }

    pub fn into_config(self) -> Result<SessionConfig, SetupError> {
        let rounds = RoundCount::new(self.rounds)?;
        Ok(SessionConfig::new(self.local_symbol, rounds))
    }
}
