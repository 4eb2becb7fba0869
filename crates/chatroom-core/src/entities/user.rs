//! User entity - represents a chat participant

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::AdditionalInfo;

/// A chat user. Registered users live in the [`crate::registry::UserRegistry`];
/// ephemeral users are constructed at join time and never stored.
///
/// A snapshot of this struct is copied into each connection and into every
/// outgoing message, so edits to a registered user never mutate history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    #[serde(rename = "firstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(rename = "lastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        rename = "additionalInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_info: Option<AdditionalInfo>,
}

impl User {
    /// Create an ephemeral user with only a display name.
    pub fn ephemeral(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The author of system notices ("joined" / "left" messages).
    pub fn system() -> Self {
        Self {
            id: Uuid::nil(),
            name: Some("System".to_string()),
            ..Self::default()
        }
    }

    /// Resolve the name shown in chat.
    ///
    /// Precedence: `name`, then `firstName lastName`, then `firstName`,
    /// falling back to `"Anonymous"`.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{first} {last}")
            }
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => "Anonymous".to_string(),
        }
    }
}
