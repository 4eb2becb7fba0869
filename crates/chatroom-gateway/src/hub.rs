//! Hub
//!
//! The process-wide registry of rooms. Owns room birth (id allocation,
//! engine and watcher spawn) and death (removal after shutdown). Handlers
//! receive the hub as explicit `Arc` state rather than a global.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chatroom_common::RoomConfig;
use chatroom_core::{AdditionalInfo, User};
use tokio::sync::RwLock;

use crate::room::{watcher::watch_idle, Room};

pub struct Hub {
    rooms: RwLock<HashMap<u64, Arc<Room>>>,
    next_room_id: AtomicU64,
    config: RoomConfig,
}

impl Hub {
    pub fn new(config: RoomConfig) -> Arc<Self> {
        Arc::new(Self {
            rooms: RwLock::new(HashMap::new()),
            next_room_id: AtomicU64::new(0),
            config,
        })
    }

    /// Allocate the next room id. Ids start at 1, grow monotonically and
    /// are never reused within the process lifetime.
    fn next_room_id(&self) -> u64 {
        self.next_room_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Create a room and start its engine and idle watcher.
    pub async fn create_room(self: &Arc<Self>, additional_info: AdditionalInfo) -> Arc<Room> {
        let id = self.next_room_id();
        let (room, channels) = Room::new(id, additional_info);

        tracing::info!(room_id = id, "creating new room");
        self.rooms.write().await.insert(id, room.clone());

        tokio::spawn(room.clone().run(channels));
        tokio::spawn(watch_idle(self.clone(), room.clone(), self.config));

        room
    }

    pub async fn room(&self, id: u64) -> Option<Arc<Room>> {
        self.rooms.read().await.get(&id).cloned()
    }

    /// Snapshot of all rooms in ascending id order.
    pub async fn list_rooms(&self) -> Vec<Arc<Room>> {
        let mut rooms: Vec<Arc<Room>> = self.rooms.read().await.values().cloned().collect();
        rooms.sort_by_key(|room| room.id());
        rooms
    }

    /// Remove a room from the registry. Idempotent; does not shut the
    /// room down; termination is signaled through the room itself.
    pub async fn delete_room(&self, id: u64) {
        tracing::info!(room_id = id, "deleting room");
        self.rooms.write().await.remove(&id);
    }

    /// Every participant across all rooms, paired with their room id.
    pub async fn users_with_rooms(&self) -> Vec<(User, u64)> {
        let mut result = Vec::new();
        for room in self.list_rooms().await {
            for user in room.users().await {
                result.push((user, room.id()));
            }
        }
        result
    }
}
