//! Chat-room server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p chatroom-api
//! ```
//!
//! Configuration is loaded from environment variables (see
//! `chatroom_common::AppConfig`).

use chatroom_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; tracing is not up yet, so report to stderr.
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    // Initialize tracing
    if let Err(e) = try_init_tracing(&config.log) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        addr = %config.server.address(),
        room_idle_timeout_secs = config.room.idle_timeout.as_secs(),
        "Starting chat-room server..."
    );

    chatroom_api::run(config).await?;

    Ok(())
}
