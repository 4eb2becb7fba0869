//! # chatroom-api
//!
//! The REST control surface of the chat-room server plus the WebSocket
//! join endpoint, wired into a single Axum application.

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
