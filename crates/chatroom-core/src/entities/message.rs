//! Message entities - the wire frames exchanged over a room

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// Free-form JSON metadata carried by rooms, users and messages.
pub type AdditionalInfo = serde_json::Map<String, serde_json::Value>;

/// Messages larger than this (serialized) are broadcast but never retained.
pub const MAX_STORED_MESSAGE_BYTES: usize = 2 * 1024 * 1024;

/// The type tag of a message. `system` and `message` are retained in the
/// room history; `image` and any client-defined tag are broadcast only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    System,
    Message,
    Image,
    Custom(String),
}

impl MessageType {
    /// Whether messages of this type belong in the room history.
    pub fn is_persistable(&self) -> bool {
        matches!(self, Self::System | Self::Message)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Message => "message",
            Self::Image => "image",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "message" => Self::Message,
            "image" => Self::Image,
            _ => Self::Custom(value),
        }
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame sent by a client over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,

    pub message: String,

    #[serde(rename = "additionalInfo", default)]
    pub additional_info: Option<AdditionalInfo>,
}

/// A frame sent by the server to every participant of a room.
///
/// The id and timestamp are assigned by the server before serialization;
/// clients always see the authoritative post-serialize form, including the
/// sender of the original message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub id: Uuid,

    #[serde(rename = "type")]
    pub kind: MessageType,

    pub message: String,

    pub timestamp: DateTime<Utc>,

    pub user: User,

    #[serde(
        rename = "additionalInfo",
        default,
        skip_serializing_if = "AdditionalInfo::is_empty"
    )]
    pub additional_info: AdditionalInfo,
}

impl OutgoingMessage {
    /// Build a message from an inbound frame, stamping a fresh id, the
    /// server time, and the sender's user snapshot.
    pub fn from_incoming(incoming: IncomingMessage, user: User) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: incoming.kind,
            message: incoming.message,
            timestamp: Utc::now(),
            user,
            additional_info: incoming.additional_info.unwrap_or_default(),
        }
    }

    /// Build a system notice authored by the system user.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MessageType::System,
            message: text.into(),
            timestamp: Utc::now(),
            user: User::system(),
            additional_info: AdditionalInfo::new(),
        }
    }

    /// Whether a serialized form of this length is retained in history.
    pub fn is_storable(&self, encoded_len: usize) -> bool {
        self.kind.is_persistable() && encoded_len > 0 && encoded_len < MAX_STORED_MESSAGE_BYTES
    }
}
