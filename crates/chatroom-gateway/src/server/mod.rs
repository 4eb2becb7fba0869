//! WebSocket serving

mod handler;

pub use handler::{serve_socket, MAX_FRAME_BYTES};
