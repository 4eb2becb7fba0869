//! WebSocket connection handling
//!
//! Drives one upgraded socket: announces the join, registers the client,
//! then runs the read pump on the handler task with the write pump on a
//! dedicated task.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use chatroom_core::{IncomingMessage, OutgoingMessage, User};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::connection::Client;
use crate::room::Room;

/// Upper bound for a single inbound frame or message.
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

/// A connection with no inbound traffic (including pongs) for this long
/// is considered dead.
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-frame write deadline.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Heartbeat interval; must stay well under [`READ_TIMEOUT`] on the peer.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Serve an upgraded WebSocket for one participant of `room`.
pub async fn serve_socket(socket: WebSocket, room: Arc<Room>, user: User) {
    let (client, outbound_rx) = Client::new(user);
    let (sink, stream) = socket.split();

    // The joined notice is stored and broadcast before registration, so
    // existing members see it live and the joiner reads it from history.
    let notice =
        OutgoingMessage::system(format!("{} joined the room", client.user().display_name()));
    room.store().store(notice.clone()).await;
    match serde_json::to_vec(&notice) {
        Ok(payload) => {
            if !room.try_broadcast(Bytes::from(payload)).await {
                tracing::debug!(room_id = room.id(), "joined notice dropped, room draining");
            }
        }
        Err(error) => {
            tracing::error!(room_id = room.id(), %error, "failed to encode joined notice");
        }
    }

    if !room.try_register(client.clone()).await {
        tracing::debug!(room_id = room.id(), "register refused, room draining");
        client.close_send().await;
        return;
    }

    tracing::info!(
        room_id = room.id(),
        user_id = %client.user().id,
        "client connected"
    );

    tokio::spawn(write_pump(sink, outbound_rx));

    read_pump(stream, &client, &room).await;

    client.disconnect(&room).await;
}

/// Drain the outbound queue to the socket, interleaved with heartbeat
/// pings. Exits when the queue is closed or a write fails; either way the
/// socket is finished here.
async fn write_pump(mut sink: SplitSink<WebSocket, Message>, mut outbound_rx: mpsc::Receiver<Bytes>) {
    let mut ticker = tokio::time::interval(PING_INTERVAL);
    // The first tick of an interval fires immediately; the heartbeat
    // should start one period from now.
    ticker.tick().await;

    loop {
        tokio::select! {
            received = outbound_rx.recv() => match received {
                Some(payload) => {
                    let text = String::from_utf8_lossy(&payload).into_owned();
                    match timeout(WRITE_TIMEOUT, sink.send(Message::Text(text))).await {
                        Ok(Ok(())) => {}
                        Ok(Err(error)) => {
                            tracing::debug!(%error, "websocket write failed");
                            return;
                        }
                        Err(_) => {
                            tracing::debug!("websocket write timed out");
                            return;
                        }
                    }
                }
                None => {
                    // Queue closed: say goodbye and stop.
                    let _ = timeout(WRITE_TIMEOUT, sink.send(Message::Close(None))).await;
                    return;
                }
            },

            _ = ticker.tick() => {
                let ping = timeout(WRITE_TIMEOUT, sink.send(Message::Ping(Vec::new()))).await;
                if !matches!(ping, Ok(Ok(()))) {
                    tracing::debug!("heartbeat failed");
                    return;
                }
            }
        }
    }
}

/// Decode inbound frames and route them into the room until the peer
/// goes away, the read deadline expires, or the room starts draining.
async fn read_pump(mut stream: SplitStream<WebSocket>, client: &Arc<Client>, room: &Arc<Room>) {
    loop {
        let frame = match timeout(READ_TIMEOUT, stream.next()).await {
            Err(_) => {
                tracing::debug!(
                    room_id = room.id(),
                    user_id = %client.user().id,
                    "read deadline expired"
                );
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(error))) => {
                tracing::warn!(
                    room_id = room.id(),
                    user_id = %client.user().id,
                    %error,
                    "websocket read error"
                );
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => {
                if !handle_inbound(client, room, &text).await {
                    break;
                }
            }
            Message::Close(_) => {
                tracing::debug!(
                    room_id = room.id(),
                    user_id = %client.user().id,
                    "peer closed the connection"
                );
                break;
            }
            // Pings are answered by the framework; pongs and binary
            // frames only refresh the read window.
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
        }
    }
}

/// Returns `false` when the room refused the broadcast (draining) and
/// the pump should stop.
async fn handle_inbound(client: &Arc<Client>, room: &Arc<Room>, text: &str) -> bool {
    let incoming: IncomingMessage = match serde_json::from_str(text) {
        Ok(incoming) => incoming,
        Err(error) => {
            tracing::debug!(
                room_id = room.id(),
                user_id = %client.user().id,
                %error,
                "undecodable inbound frame"
            );
            return true;
        }
    };

    let outgoing = OutgoingMessage::from_incoming(incoming, client.user().clone());
    let payload = match serde_json::to_vec(&outgoing) {
        Ok(payload) => Bytes::from(payload),
        Err(error) => {
            tracing::error!(
                room_id = room.id(),
                message_id = %outgoing.id,
                %error,
                "failed to encode message"
            );
            return true;
        }
    };

    let encoded_len = payload.len();
    if !room.try_broadcast(payload).await {
        tracing::debug!(
            room_id = room.id(),
            message_id = %outgoing.id,
            "broadcast refused, room draining"
        );
        return false;
    }

    if outgoing.is_storable(encoded_len) {
        room.store().store(outgoing).await;
    }
    true
}
