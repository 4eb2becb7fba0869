//! WebSocket join handler
//!
//! GET /join/{roomID} resolves the room and the joining user, then hands
//! the upgraded socket to the gateway.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use chatroom_core::User;
use chatroom_gateway::{serve_socket, server::MAX_FRAME_BYTES};
use rand::seq::SliceRandom;
use serde::Deserialize;

use super::{parse_room_id, parse_uuid};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Display names handed to joiners that bring neither a registered user
/// nor a name of their own.
const DEFAULT_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi", "Ivan", "Judy",
];

#[derive(Debug, Deserialize)]
pub struct JoinParams {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Join a room over WebSocket
///
/// GET /join/{roomID}?userId=<uuid> | ?user=<name>
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(params): Query<JoinParams>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let room_id = parse_room_id(&room_id)?;
    let room = state
        .hub()
        .room(room_id)
        .await
        .ok_or(ApiError::NotFound("room"))?;

    let user = resolve_user(&state, &params)?;
    tracing::info!(
        room_id,
        user_id = %user.id,
        remote_addr = %remote_addr,
        "websocket join"
    );

    Ok(ws
        .max_frame_size(MAX_FRAME_BYTES)
        .max_message_size(MAX_FRAME_BYTES)
        .on_upgrade(move |socket| serve_socket(socket, room, user)))
}

/// A `userId` must resolve in the registry; otherwise the joiner is an
/// ephemeral user named by the `user` parameter or a built-in default.
fn resolve_user(state: &AppState, params: &JoinParams) -> Result<User, ApiError> {
    if let Some(raw) = params.user_id.as_deref() {
        let user_id = parse_uuid(raw, "user")?;
        return state
            .users()
            .get(&user_id)
            .ok_or(ApiError::NotFound("user"));
    }

    let name = params
        .user
        .clone()
        .unwrap_or_else(|| pick_default_name().to_string());
    Ok(User::ephemeral(name))
}

fn pick_default_name() -> &'static str {
    DEFAULT_NAMES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Anonymous")
}
