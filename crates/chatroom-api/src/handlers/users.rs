//! User handlers
//!
//! CRUD against the user registry, plus the per-room and cross-room
//! participant listings.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use chatroom_core::{AdditionalInfo, PatchUser, User};
use serde::{Deserialize, Serialize};

use super::{parse_room_id, parse_uuid};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "additionalInfo", default)]
    pub additional_info: Option<AdditionalInfo>,
}

/// PUT uses the same shape as creation: every field is replaced.
pub type UpdateUserRequest = CreateUserRequest;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserWithRoom {
    pub user: User,
    #[serde(rename = "roomId")]
    pub room_id: u64,
}

#[derive(Debug, Serialize)]
pub struct UsersWithRoomsResponse {
    pub users: Vec<UserWithRoom>,
}

/// Create user
///
/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Created<Json<User>>> {
    let request: CreateUserRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;

    let user = state.users().create(
        request.first_name,
        request.last_name,
        request.name,
        request.additional_info,
    );
    Ok(Created(Json(user)))
}

/// List users
///
/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users().list())
}

/// Replace user
///
/// PUT /users/{userID}
pub async fn put_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<User>> {
    let user_id = parse_uuid(&user_id, "user")?;
    let request: UpdateUserRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;

    let user = state
        .users()
        .update(
            user_id,
            request.first_name,
            request.last_name,
            request.name,
            request.additional_info,
        )
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// Partially update user
///
/// PATCH /users/{userID}. Metadata merges into the existing map.
pub async fn patch_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<User>> {
    let user_id = parse_uuid(&user_id, "user")?;
    let updates: PatchUser =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(e.to_string()))?;

    let user = state
        .users()
        .patch(user_id, updates)
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// Delete user
///
/// DELETE /users/{userID}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<NoContent> {
    let user_id = parse_uuid(&user_id, "user")?;
    if !state.users().delete(&user_id) {
        return Err(ApiError::NotFound("user"));
    }
    Ok(NoContent)
}

/// Participants of one room
///
/// GET /rooms/{roomID}/users
pub async fn get_room_users(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ApiResult<Json<UsersResponse>> {
    let room_id = parse_room_id(&room_id)?;
    let room = state
        .hub()
        .room(room_id)
        .await
        .ok_or(ApiError::NotFound("room"))?;
    Ok(Json(UsersResponse {
        users: room.users().await,
    }))
}

/// Participants across all rooms
///
/// GET /rooms/users
pub async fn get_all_room_users(State(state): State<AppState>) -> Json<UsersWithRoomsResponse> {
    let users = state
        .hub()
        .users_with_rooms()
        .await
        .into_iter()
        .map(|(user, room_id)| UserWithRoom { user, room_id })
        .collect();
    Json(UsersWithRoomsResponse { users })
}
