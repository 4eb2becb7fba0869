//! Route definitions
//!
//! All routes organized by resource.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{health, join, messages, rooms, users};
use crate::state::AppState;

/// Create the application router with all routes.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(room_routes())
        .merge(message_routes())
        .merge(user_routes())
        .merge(join_routes())
        .merge(health_routes())
}

/// Room routes
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(rooms::create_room).get(rooms::list_rooms))
        .route("/rooms/:room_id", get(rooms::get_room))
        .route("/rooms/:room_id", patch(rooms::patch_room))
        .route("/rooms/:room_id", put(rooms::put_room))
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/:room_id/messages", get(messages::get_room_messages))
        .route(
            "/rooms/:room_id/messages/:message_id",
            get(messages::get_room_message),
        )
        .route(
            "/rooms/:room_id/messages/:message_id",
            patch(messages::patch_room_message),
        )
        .route(
            "/rooms/:room_id/messages/:message_id",
            put(messages::put_room_message),
        )
        .route(
            "/rooms/:room_id/messages/:message_id",
            delete(messages::delete_room_message),
        )
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/:user_id", put(users::put_user))
        .route("/users/:user_id", patch(users::patch_user))
        .route("/users/:user_id", delete(users::delete_user))
        .route("/rooms/users", get(users::get_all_room_users))
        .route("/rooms/:room_id/users", get(users::get_room_users))
}

/// WebSocket join route
fn join_routes() -> Router<AppState> {
    Router::new().route("/join/:room_id", get(join::join_room))
}

/// Health and build-info routes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/info", get(health::info))
}
