//! # chatroom-core
//!
//! Domain layer containing the message and user entities plus the
//! in-memory user registry. This crate has no dependency on the web
//! framework or the room runtime.

pub mod entities;
pub mod registry;

// Re-export commonly used types at crate root
pub use entities::{
    AdditionalInfo, IncomingMessage, MessageType, OutgoingMessage, User, MAX_STORED_MESSAGE_BYTES,
};
pub use registry::{PatchUser, UserRegistry};
