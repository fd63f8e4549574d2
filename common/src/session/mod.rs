mod broadcaster;
mod endpoint;
mod error;
mod events;
mod state;

pub use broadcaster::{EventBroadcaster, EventSender};
pub use endpoint::{HostListener, ReceiveLoop, SessionEndpoint};
pub use error::{ProtocolViolation, SessionError};
pub use events::{ConnectionState, PresentationCommand, SessionEvent};
pub use state::{SessionSnapshot, SessionState};
