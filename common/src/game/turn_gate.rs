use std::fmt;

use super::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Local,
    Remote,
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Turn::Local => write!(f, "Yours"),
            Turn::Remote => write!(f, "Opponent's"),
        }
    }
}

/// Decides which side may place the next mark. Every round starts from the
/// same side the session started from.
#[derive(Debug, Clone)]
pub struct TurnGate {
    initial: Turn,
    current: Turn,
}

impl TurnGate {
    pub fn new(initial: Turn) -> Self {
        Self {
            initial,
            current: initial,
        }
    }

    pub fn current(&self) -> Turn {
        self.current
    }

    pub fn is_local_turn(&self) -> bool {
        self.current == Turn::Local
    }

    pub fn check_local(&self) -> Result<(), GameError> {
        if self.is_local_turn() {
            Ok(())
        } else {
            Err(GameError::NotMyTurn)
        }
    }

    pub fn local_moved(&mut self) -> Turn {
        self.current = Turn::Remote;
        self.current
    }

    pub fn remote_moved(&mut self) -> Turn {
        self.current = Turn::Local;
        self.current
    }

    pub fn reset(&mut self) -> Turn {
        self.current = self.initial;
        self.current
    }
}
