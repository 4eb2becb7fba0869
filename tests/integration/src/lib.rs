//! Integration test support for the chat-room server

pub mod helpers;
