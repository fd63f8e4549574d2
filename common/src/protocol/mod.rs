mod codec;
mod role;

pub use codec::{CONNECTOR_MESSAGE_LEN, FramingError, HOST_MESSAGE_LEN, MoveCodec, WireMessage};
pub use role::Role;
