//! Room inactivity watcher
//!
//! One task per room: periodically samples the activity timestamp and
//! tears the room down once it has been idle past the configured
//! threshold. Stops on its own when the engine reports closed.

use std::sync::Arc;

use chatroom_common::RoomConfig;

use crate::hub::Hub;
use crate::room::Room;

pub(crate) async fn watch_idle(hub: Arc<Hub>, room: Arc<Room>, config: RoomConfig) {
    let mut ticker = tokio::time::interval(config.sweep_interval);
    let mut closed = room.subscribe_closed();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if room.idle_for().await > config.idle_timeout {
                    room.shutdown();
                    room.disconnect_all().await;
                    hub.delete_room(room.id()).await;
                    tracing::info!(room_id = room.id(), "removing room after idle timeout");
                    return;
                }
            }

            _ = async { let _ = closed.wait_for(|done| *done).await; } => {
                tracing::debug!(room_id = room.id(), "stopping idle watcher");
                return;
            }
        }
    }
}
