//! Per-room message history
//!
//! An insertion-ordered, in-memory log of broadcast messages with lookup
//! and edit support. Only persistable messages within the size bound ever
//! reach this store; the callers enforce that predicate.

use std::collections::HashMap;

use chatroom_core::{AdditionalInfo, OutgoingMessage};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct StoreInner {
    order: Vec<Uuid>,
    messages: HashMap<Uuid, OutgoingMessage>,
}

#[derive(Default)]
pub struct MessageStore {
    inner: RwLock<StoreInner>,
}

impl MessageStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a message to the log.
    pub async fn store(&self, message: OutgoingMessage) {
        let mut inner = self.inner.write().await;
        let id = message.id;
        if inner.messages.insert(id, message).is_none() {
            inner.order.push(id);
        }
    }

    /// All messages in insertion order.
    pub async fn messages(&self) -> Vec<OutgoingMessage> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| inner.messages.get(id))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &Uuid) -> Option<OutgoingMessage> {
        self.inner.read().await.messages.get(id).cloned()
    }

    /// Field-level edit. The body is replaced when provided; the metadata
    /// map is wholly replaced when provided (not merged). Stamps
    /// `modified: true`. Returns the updated copy, or `None` for an
    /// unknown id.
    pub async fn patch(
        &self,
        id: &Uuid,
        message: Option<String>,
        additional_info: Option<AdditionalInfo>,
    ) -> Option<OutgoingMessage> {
        let mut inner = self.inner.write().await;
        let entry = inner.messages.get_mut(id)?;
        if let Some(message) = message {
            entry.message = message;
        }
        if let Some(additional_info) = additional_info {
            entry.additional_info = additional_info;
        }
        entry
            .additional_info
            .insert("modified".to_string(), serde_json::Value::Bool(true));
        Some(entry.clone())
    }

    /// Unconditional replace of body and metadata. Stamps `modified: true`.
    pub async fn replace(
        &self,
        id: &Uuid,
        message: String,
        additional_info: AdditionalInfo,
    ) -> Option<OutgoingMessage> {
        let mut inner = self.inner.write().await;
        let entry = inner.messages.get_mut(id)?;
        entry.message = message;
        entry.additional_info = additional_info;
        entry
            .additional_info
            .insert("modified".to_string(), serde_json::Value::Bool(true));
        Some(entry.clone())
    }

    /// Soft delete: the body becomes the literal `deleted` and the
    /// metadata collapses to `{"deleted": true}`.
    pub async fn mark_deleted(&self, id: &Uuid) -> Option<OutgoingMessage> {
        let mut inner = self.inner.write().await;
        let entry = inner.messages.get_mut(id)?;
        entry.message = "deleted".to_string();
        entry.additional_info = AdditionalInfo::new();
        entry
            .additional_info
            .insert("deleted".to_string(), serde_json::Value::Bool(true));
        Some(entry.clone())
    }
}
