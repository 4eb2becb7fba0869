//! Domain entities

mod message;
mod user;

pub use message::{
    AdditionalInfo, IncomingMessage, MessageType, OutgoingMessage, MAX_STORED_MESSAGE_BYTES,
};
pub use user::User;
