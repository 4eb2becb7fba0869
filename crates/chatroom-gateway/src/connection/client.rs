//! A single participant's connection state
//!
//! The client owns the bounded outbound queue feeding its write pump.
//! Several parties may race to close that queue (the engine on
//! unregister or eviction, the watcher on timeout, the disconnect path);
//! holding the sender in a `Mutex<Option<…>>` makes the close happen at
//! most once no matter who wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chatroom_core::{OutgoingMessage, User};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::room::Room;

/// Bound of the outbound queue. A client that falls this far behind is
/// considered dead and gets evicted by the engine.
pub const SEND_QUEUE_CAPACITY: usize = 256;

pub struct Client {
    id: Uuid,
    user: User,
    send: Mutex<Option<mpsc::Sender<Bytes>>>,
    disconnected: AtomicBool,
}

impl Client {
    /// Build a client and the receiving end of its outbound queue.
    pub fn new(user: User) -> (Arc<Self>, mpsc::Receiver<Bytes>) {
        Self::with_queue_capacity(user, SEND_QUEUE_CAPACITY)
    }

    pub(crate) fn with_queue_capacity(
        user: User,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        let client = Arc::new(Self {
            id: Uuid::new_v4(),
            user,
            send: Mutex::new(Some(tx)),
            disconnected: AtomicBool::new(false),
        });
        (client, rx)
    }

    /// Connection id, distinct from the user id: the same user may hold
    /// several connections.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Non-blocking enqueue. `false` means the queue is full or already
    /// closed; the caller treats either as a failed delivery.
    pub async fn try_send(&self, payload: Bytes) -> bool {
        match self.send.lock().await.as_ref() {
            Some(tx) => tx.try_send(payload).is_ok(),
            None => false,
        }
    }

    /// Close the outbound queue. Dropping the sender ends the write
    /// pump's receive loop; taking it out of the option guarantees the
    /// drop happens exactly once.
    pub async fn close_send(&self) {
        self.send.lock().await.take();
    }

    /// The once-only departure path, run when a pump terminates.
    ///
    /// The "left" notice is stored before the broadcast attempt so the
    /// departure is recorded even when the room is already draining; the
    /// broadcast and unregister are best-effort.
    pub async fn disconnect(self: &Arc<Self>, room: &Room) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }

        let notice =
            OutgoingMessage::system(format!("{} left the room", self.user.display_name()));
        room.store().store(notice.clone()).await;

        match serde_json::to_vec(&notice) {
            Ok(payload) => {
                if !room.try_broadcast(Bytes::from(payload)).await {
                    tracing::debug!(
                        room_id = room.id(),
                        user_id = %self.user.id,
                        "left notice dropped, room draining"
                    );
                }
            }
            Err(error) => {
                tracing::error!(room_id = room.id(), %error, "failed to encode left notice");
            }
        }

        if !room.try_unregister(Arc::clone(self)).await {
            tracing::debug!(
                room_id = room.id(),
                user_id = %self.user.id,
                "unregister skipped, room draining"
            );
        }

        tracing::info!(room_id = room.id(), user_id = %self.user.id, "client disconnected");
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("user_id", &self.user.id)
            .finish()
    }
}
