//! User registry
//!
//! Process-wide mapping from user id to [`User`], shared between the REST
//! surface and the WebSocket join handler. Uses `DashMap` for concurrent
//! access.

use dashmap::DashMap;
use uuid::Uuid;

use crate::entities::{AdditionalInfo, User};

/// Field-level update for [`UserRegistry::patch`]. Absent fields are left
/// untouched; `additional_info` is merged into the existing metadata.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PatchUser {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,

    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "additionalInfo", default)]
    pub additional_info: Option<AdditionalInfo>,
}

/// Registry of persistent (per process lifetime) users.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: DashMap<Uuid, User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user, assigning a fresh id.
    pub fn create(
        &self,
        first_name: Option<String>,
        last_name: Option<String>,
        name: Option<String>,
        additional_info: Option<AdditionalInfo>,
    ) -> User {
        let user = User {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            name,
            additional_info,
        };
        self.users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "user created");
        user
    }

    /// Snapshot a user by id.
    pub fn get(&self, id: &Uuid) -> Option<User> {
        self.users.get(id).map(|u| u.value().clone())
    }

    /// Unordered snapshot of all users.
    pub fn list(&self) -> Vec<User> {
        self.users.iter().map(|u| u.value().clone()).collect()
    }

    /// Full replace of every field. Returns the updated user, or `None`
    /// if the id is unknown.
    pub fn update(
        &self,
        id: Uuid,
        first_name: Option<String>,
        last_name: Option<String>,
        name: Option<String>,
        additional_info: Option<AdditionalInfo>,
    ) -> Option<User> {
        let mut entry = self.users.get_mut(&id)?;
        entry.first_name = first_name;
        entry.last_name = last_name;
        entry.name = name;
        entry.additional_info = additional_info;

        tracing::info!(user_id = %id, "user updated");
        Some(entry.value().clone())
    }

    /// Field-level update. Name fields are replaced when provided;
    /// metadata is merged key-by-key into the existing map.
    pub fn patch(&self, id: Uuid, updates: PatchUser) -> Option<User> {
        let mut entry = self.users.get_mut(&id)?;
        if let Some(first_name) = updates.first_name {
            entry.first_name = Some(first_name);
        }
        if let Some(last_name) = updates.last_name {
            entry.last_name = Some(last_name);
        }
        if let Some(name) = updates.name {
            entry.name = Some(name);
        }
        if let Some(additional_info) = updates.additional_info {
            let merged = entry.additional_info.get_or_insert_with(AdditionalInfo::new);
            for (key, value) in additional_info {
                merged.insert(key, value);
            }
        }

        tracing::info!(user_id = %id, "user patched");
        Some(entry.value().clone())
    }

    /// Remove a user. Returns whether it existed.
    pub fn delete(&self, id: &Uuid) -> bool {
        let removed = self.users.remove(id).is_some();
        if removed {
            tracing::info!(user_id = %id, "user deleted");
        }
        removed
    }
}
