pub mod config;
pub mod game;
pub mod logger;
pub mod protocol;
pub mod session;

pub use game::{
    Board, Cell, GameError, HostSetup, Move, Position, RoundCount, RoundOutcome, SessionConfig,
    SetupError, Symbol, Turn,
};
pub use protocol::{FramingError, MoveCodec, Role, WireMessage};
pub use session::{
    ConnectionState, EventBroadcaster, HostListener, PresentationCommand, ReceiveLoop,
    SessionEndpoint, SessionError, SessionEvent, SessionSnapshot,
};
