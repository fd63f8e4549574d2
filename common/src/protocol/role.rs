use std::fmt;

use crate::game::Turn;

use super::codec::{CONNECTOR_MESSAGE_LEN, HOST_MESSAGE_LEN};

/// The two ends of a session. Everything that differs between them is
/// answered here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Host,
    Connector,
}

impl Role {
    pub fn peer(&self) -> Role {
        match self {
            Role::Host => Role::Connector,
            Role::Connector => Role::Host,
        }
    }

    pub fn initial_turn(&self) -> Turn {
        match self {
            Role::Host => Turn::Local,
            Role::Connector => Turn::Remote,
        }
    }

    pub fn outbound_len(&self) -> usize {
        match self {
            Role::Host => HOST_MESSAGE_LEN,
            Role::Connector => CONNECTOR_MESSAGE_LEN,
        }
    }

    pub fn inbound_len(&self) -> usize {
        self.peer().outbound_len()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "Host"),
            Role::Connector => write!(f, "Connector"),
        }
    }
}
