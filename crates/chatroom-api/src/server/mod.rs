//! Server setup and initialization
//!
//! Builds the application state, the Axum router and runs the listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use chatroom_common::{AppConfig, AppError};
use chatroom_core::UserRegistry;
use chatroom_gateway::Hub;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Initialize all dependencies and create the application state
pub fn create_app_state(config: AppConfig) -> AppState {
    let hub = Hub::new(config.room);
    let users = Arc::new(UserRegistry::new());
    AppState::new(hub, users, config)
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid listen address: {e}")))?;

    let state = create_app_state(config);
    let app = create_app(state);

    run_server(app, addr).await
}
