//! # chatroom-gateway
//!
//! The real-time half of the chat-room server: the [`hub::Hub`] owning
//! room lifecycles, the per-room event loop with its idle watcher and
//! message history, and the per-connection WebSocket pumps.

pub mod connection;
pub mod hub;
pub mod room;
pub mod server;

pub use connection::Client;
pub use hub::Hub;
pub use room::{MessageStore, Room};
pub use server::serve_socket;
