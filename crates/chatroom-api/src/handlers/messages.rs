//! Message handlers
//!
//! History reads and message edits. Every successful edit is re-broadcast
//! to the room with the message's original type; receivers tell edits
//! apart by the `modified` / `deleted` metadata markers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use chatroom_core::{AdditionalInfo, OutgoingMessage};
use chatroom_gateway::Room;
use serde::{Deserialize, Serialize};

use super::{parse_room_id, parse_uuid};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<OutgoingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct PatchMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "additionalInfo", default)]
    pub additional_info: Option<AdditionalInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PutMessageRequest {
    pub message: String,
    #[serde(rename = "additionalInfo", default)]
    pub additional_info: Option<AdditionalInfo>,
}

/// Get room history
///
/// GET /rooms/{roomID}/messages, returned in insertion order.
pub async fn get_room_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<Json<MessagesResponse>> {
    let room = resolve_room(&state, &room_id).await?;
    Ok(Json(MessagesResponse {
        messages: room.store().messages().await,
    }))
}

/// Get a single message
///
/// GET /rooms/{roomID}/messages/{messageID}
pub async fn get_room_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<OutgoingMessage>> {
    let room = resolve_room(&state, &room_id).await?;
    let message_id = parse_uuid(&message_id, "message")?;
    let message = room
        .store()
        .get(&message_id)
        .await
        .ok_or(ApiError::NotFound("message"))?;
    Ok(Json(message))
}

/// Edit a message
///
/// PATCH /rooms/{roomID}/messages/{messageID}. Requires at least one of
/// `message` (non-empty) or `additionalInfo`. A provided metadata map
/// replaces the stored one wholesale.
pub async fn patch_room_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<OutgoingMessage>> {
    let room = resolve_room(&state, &room_id).await?;
    let message_id = parse_uuid(&message_id, "message")?;
    let request: PatchMessageRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;

    if request.message.is_none() && request.additional_info.is_none() {
        return Err(ApiError::invalid_body(
            "at least one of message or additionalInfo is required",
        ));
    }
    if matches!(request.message.as_deref(), Some("")) {
        return Err(ApiError::invalid_body("message must not be empty"));
    }

    let updated = room
        .store()
        .patch(&message_id, request.message, request.additional_info)
        .await
        .ok_or(ApiError::NotFound("message"))?;

    tracing::info!(room_id = room.id(), message_id = %message_id, "message patched");
    broadcast_edit(&room, &updated).await?;
    Ok(Json(updated))
}

/// Replace a message
///
/// PUT /rooms/{roomID}/messages/{messageID}. Full replace of body and
/// metadata.
pub async fn put_room_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<OutgoingMessage>> {
    let room = resolve_room(&state, &room_id).await?;
    let message_id = parse_uuid(&message_id, "message")?;
    let request: PutMessageRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;

    let updated = room
        .store()
        .replace(
            &message_id,
            request.message,
            request.additional_info.unwrap_or_default(),
        )
        .await
        .ok_or(ApiError::NotFound("message"))?;

    tracing::info!(room_id = room.id(), message_id = %message_id, "message replaced");
    broadcast_edit(&room, &updated).await?;
    Ok(Json(updated))
}

/// Soft-delete a message
///
/// DELETE /rooms/{roomID}/messages/{messageID}. The body becomes the
/// literal `deleted`, the metadata `{"deleted": true}`.
pub async fn delete_room_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<OutgoingMessage>> {
    let room = resolve_room(&state, &room_id).await?;
    let message_id = parse_uuid(&message_id, "message")?;

    let deleted = room
        .store()
        .mark_deleted(&message_id)
        .await
        .ok_or(ApiError::NotFound("message"))?;

    tracing::info!(room_id = room.id(), message_id = %message_id, "message deleted");
    broadcast_edit(&room, &deleted).await?;
    Ok(Json(deleted))
}

async fn resolve_room(state: &AppState, raw_id: &str) -> Result<std::sync::Arc<Room>, ApiError> {
    let room_id = parse_room_id(raw_id)?;
    state
        .hub()
        .room(room_id)
        .await
        .ok_or(ApiError::NotFound("room"))
}

/// Push an edited message through the room's broadcast channel. A
/// draining room drops the broadcast silently; the edit itself already
/// succeeded.
async fn broadcast_edit(room: &Room, message: &OutgoingMessage) -> Result<(), ApiError> {
    let payload = serde_json::to_vec(message).map_err(ApiError::internal)?;
    if !room.try_broadcast(payload.into()).await {
        tracing::debug!(
            room_id = room.id(),
            message_id = %message.id,
            "edit broadcast dropped, room draining"
        );
    }
    Ok(())
}
