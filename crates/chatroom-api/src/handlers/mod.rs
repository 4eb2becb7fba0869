//! Request handlers, organized by resource

pub mod health;
pub mod join;
pub mod messages;
pub mod rooms;
pub mod users;

use crate::response::ApiError;

/// Parse a decimal room id path parameter.
pub(crate) fn parse_room_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path("invalid room id"))
}

/// Parse a message or user id path parameter.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(raw).map_err(|_| ApiError::invalid_path(format!("invalid {what} id")))
}
