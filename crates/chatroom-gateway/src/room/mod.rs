//! Room runtime
//!
//! A room is a group of clients exchanging broadcasts. All mutations of
//! the client set flow through a single event-loop task (the engine); the
//! set itself sits behind a reader/writer lock so observers can count and
//! list participants without touching the loop.

mod store;
pub(crate) mod watcher;

pub use store::MessageStore;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chatroom_core::{AdditionalInfo, User};
use tokio::sync::{mpsc, watch, RwLock};
use uuid::Uuid;

use crate::connection::Client;

/// Receivers consumed by the engine task. Produced once per room by
/// [`Room::new`] and handed to [`Room::run`].
pub(crate) struct RoomChannels {
    broadcast_rx: mpsc::Receiver<Bytes>,
    register_rx: mpsc::Receiver<Arc<Client>>,
    unregister_rx: mpsc::Receiver<Arc<Client>>,
}

/// Activity timestamp and room metadata share one lock, mirroring how
/// both are touched together on the edit paths.
struct RoomState {
    last_activity: Instant,
    additional_info: AdditionalInfo,
}

pub struct Room {
    id: u64,
    clients: RwLock<HashMap<Uuid, Arc<Client>>>,
    broadcast_tx: mpsc::Sender<Bytes>,
    register_tx: mpsc::Sender<Arc<Client>>,
    unregister_tx: mpsc::Sender<Arc<Client>>,
    shutdown: watch::Sender<bool>,
    closed: watch::Sender<bool>,
    state: RwLock<RoomState>,
    store: MessageStore,
}

impl Room {
    /// Build a room and the channel ends its engine will consume.
    pub(crate) fn new(id: u64, additional_info: AdditionalInfo) -> (Arc<Self>, RoomChannels) {
        // Rendezvous-style channels: producers wait for the engine unless
        // the room is draining, in which case the try_* helpers bail out.
        let (broadcast_tx, broadcast_rx) = mpsc::channel(1);
        let (register_tx, register_rx) = mpsc::channel(1);
        let (unregister_tx, unregister_rx) = mpsc::channel(1);
        let (shutdown, _) = watch::channel(false);
        let (closed, _) = watch::channel(false);

        let room = Arc::new(Self {
            id,
            clients: RwLock::new(HashMap::new()),
            broadcast_tx,
            register_tx,
            unregister_tx,
            shutdown,
            closed,
            state: RwLock::new(RoomState {
                last_activity: Instant::now(),
                additional_info,
            }),
            store: MessageStore::new(),
        });

        (
            room,
            RoomChannels {
                broadcast_rx,
                register_rx,
                unregister_rx,
            },
        )
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// The engine: serializes every mutation of the client set. One
    /// iteration handles exactly one event; the loop exits on the
    /// shutdown signal and emits `closed` as its last act.
    pub(crate) async fn run(self: Arc<Self>, mut channels: RoomChannels) {
        let mut shutdown = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => {
                    tracing::info!(room_id = self.id, "room shutdown signal received");
                    break;
                }

                Some(client) = channels.register_rx.recv() => {
                    self.clients.write().await.insert(client.id(), client);
                    self.touch_activity().await;
                }

                Some(client) = channels.unregister_rx.recv() => {
                    let removed = self.clients.write().await.remove(&client.id());
                    if let Some(client) = removed {
                        client.close_send().await;
                    }
                }

                Some(payload) = channels.broadcast_rx.recv() => {
                    self.fan_out(payload).await;
                }
            }
        }

        self.closed.send_replace(true);
    }

    /// Deliver one payload to every registered client. Clients whose
    /// outbound queue is full are evicted after the pass; a slow consumer
    /// never blocks the loop.
    async fn fan_out(&self, payload: Bytes) {
        self.touch_activity().await;

        // Snapshot under the read lock, then release it before sending.
        let snapshot: Vec<Arc<Client>> = self.clients.read().await.values().cloned().collect();

        let mut failed = Vec::new();
        for client in snapshot {
            if !client.try_send(payload.clone()).await {
                failed.push(client);
            }
        }

        if !failed.is_empty() {
            let mut clients = self.clients.write().await;
            for client in failed {
                tracing::warn!(
                    room_id = self.id,
                    user_id = %client.user().id,
                    "evicting slow client"
                );
                clients.remove(&client.id());
                client.close_send().await;
            }
        }
    }

    /// Offer a payload to the engine. Returns `false` once the room is
    /// draining instead of blocking on a dead loop.
    pub async fn try_broadcast(&self, payload: Bytes) -> bool {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return false;
        }
        tokio::select! {
            sent = self.broadcast_tx.send(payload) => sent.is_ok(),
            _ = shutdown.wait_for(|stop| *stop) => false,
        }
    }

    /// Offer a new client to the engine; `false` when the room is draining.
    pub async fn try_register(&self, client: Arc<Client>) -> bool {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return false;
        }
        tokio::select! {
            sent = self.register_tx.send(client) => sent.is_ok(),
            _ = shutdown.wait_for(|stop| *stop) => false,
        }
    }

    /// Ask the engine to drop a client; `false` when the room is draining.
    pub async fn try_unregister(&self, client: Arc<Client>) -> bool {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return false;
        }
        tokio::select! {
            sent = self.unregister_tx.send(client) => sent.is_ok(),
            _ = shutdown.wait_for(|stop| *stop) => false,
        }
    }

    /// Signal the engine to terminate. Idempotent: only the first call
    /// transitions the room into draining.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            tracing::debug!(room_id = self.id, "room draining");
        }
    }

    /// A receiver that resolves once the engine has exited.
    pub fn subscribe_closed(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    /// Close every client's outbound queue. Used on the timeout path;
    /// the write pumps observe the closed queue and finish their sockets.
    pub async fn disconnect_all(&self) {
        let clients = self.clients.write().await;
        for client in clients.values() {
            client.close_send().await;
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// User snapshots of everyone currently registered.
    pub async fn users(&self) -> Vec<User> {
        self.clients
            .read()
            .await
            .values()
            .map(|client| client.user().clone())
            .collect()
    }

    pub(crate) async fn touch_activity(&self) {
        self.state.write().await.last_activity = Instant::now();
    }

    /// Time since the last register or broadcast.
    pub async fn idle_for(&self) -> Duration {
        self.state.read().await.last_activity.elapsed()
    }

    /// A copy of the room metadata; callers cannot mutate the original.
    pub async fn additional_info(&self) -> AdditionalInfo {
        self.state.read().await.additional_info.clone()
    }

    /// Replace the room metadata wholesale. Does not count as activity.
    pub async fn update_additional_info(&self, additional_info: AdditionalInfo) {
        self.state.write().await.additional_info = additional_info;
    }

    /// Merge updates into the room metadata key-by-key. Does not count
    /// as activity.
    pub async fn patch_additional_info(&self, updates: AdditionalInfo) {
        let mut state = self.state.write().await;
        for (key, value) in updates {
            state.additional_info.insert(key, value);
        }
    }

}
