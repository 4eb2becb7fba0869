//! Room handlers
//!
//! Endpoints for creating, listing and editing rooms.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use chatroom_core::AdditionalInfo;
use chatroom_gateway::Room;
use serde::Serialize;

use super::parse_room_id;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    #[serde(rename = "roomID")]
    pub room_id: u64,
}

/// The external view of a room.
#[derive(Debug, Serialize)]
pub struct RoomView {
    pub id: u64,
    #[serde(rename = "onlineUser")]
    pub online_user: usize,
    #[serde(rename = "additionalInfo")]
    pub additional_info: AdditionalInfo,
}

#[derive(Debug, Serialize)]
pub struct RoomsResponse {
    pub rooms: Vec<RoomView>,
}

async fn room_view(room: &Room) -> RoomView {
    RoomView {
        id: room.id(),
        online_user: room.client_count().await,
        additional_info: room.additional_info().await,
    }
}

/// Create room
///
/// POST /rooms. The body is optional free-form metadata; anything that
/// does not parse as a JSON object is treated as no metadata.
pub async fn create_room(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<CreateRoomResponse> {
    let additional_info: AdditionalInfo = serde_json::from_slice(&body).unwrap_or_default();
    let room = state.hub().create_room(additional_info).await;
    Json(CreateRoomResponse { room_id: room.id() })
}

/// List rooms
///
/// GET /rooms, sorted by ascending id.
pub async fn list_rooms(State(state): State<AppState>) -> Json<RoomsResponse> {
    let mut rooms = Vec::new();
    for room in state.hub().list_rooms().await {
        rooms.push(room_view(&room).await);
    }
    Json(RoomsResponse { rooms })
}

/// Get room by id
///
/// GET /rooms/{roomID}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<Json<RoomView>> {
    let room_id = parse_room_id(&room_id)?;
    let room = state
        .hub()
        .room(room_id)
        .await
        .ok_or(ApiError::NotFound("room"))?;
    Ok(Json(room_view(&room).await))
}

/// Merge metadata into a room
///
/// PATCH /rooms/{roomID}. Field-level merge; does not count as activity.
pub async fn patch_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RoomView>> {
    let room_id = parse_room_id(&room_id)?;
    let updates: AdditionalInfo = serde_json::from_slice(&body)
        .map_err(|e| ApiError::invalid_body(e.to_string()))?;
    let room = state
        .hub()
        .room(room_id)
        .await
        .ok_or(ApiError::NotFound("room"))?;

    room.patch_additional_info(updates).await;
    tracing::info!(room_id, "room metadata patched");
    Ok(Json(room_view(&room).await))
}

/// Replace a room's metadata
///
/// PUT /rooms/{roomID}
pub async fn put_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RoomView>> {
    let room_id = parse_room_id(&room_id)?;
    let additional_info: AdditionalInfo = serde_json::from_slice(&body)
        .map_err(|e| ApiError::invalid_body(e.to_string()))?;
    let room = state
        .hub()
        .room(room_id)
        .await
        .ok_or(ApiError::NotFound("room"))?;

    room.update_additional_info(additional_info).await;
    tracing::info!(room_id, "room metadata replaced");
    Ok(Json(room_view(&room).await))
}
