//! Test helpers for integration tests
//!
//! Spawns a real server on an ephemeral port and drives it over HTTP and
//! WebSocket.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use chatroom_api::{create_app, create_app_state};
use chatroom_common::{AppConfig, RoomConfig};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default configuration.
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::default()).await
    }

    /// Start a server whose rooms expire quickly.
    pub async fn start_with_fast_timeout() -> Result<Self> {
        let config = AppConfig {
            room: RoomConfig {
                idle_timeout: Duration::from_millis(200),
                sweep_interval: Duration::from_millis(50),
            },
            ..AppConfig::default()
        };
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config);
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    pub async fn post_raw(&self, path: &str, body: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).body(body.to_string()).send().await?)
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.put(&url).json(body).send().await?)
    }

    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.patch(&url).json(body).send().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.delete(&url).send().await?)
    }

    /// Open a WebSocket connection to a join path.
    pub async fn connect_ws(&self, path: &str) -> Result<WsClient> {
        let (socket, _response) = connect_async(self.ws_url(path))
            .await
            .context("websocket connect failed")?;
        Ok(socket)
    }
}

/// Create a room and return its id.
pub async fn create_room(server: &TestServer, metadata: serde_json::Value) -> Result<u64> {
    let response = server.post("/rooms", &metadata).await?;
    anyhow::ensure!(response.status() == 200, "room creation failed");
    let body: serde_json::Value = response.json().await?;
    body["roomID"]
        .as_u64()
        .context("roomID missing from response")
}

/// Send a JSON frame over a WebSocket.
pub async fn send_json(socket: &mut WsClient, value: &serde_json::Value) -> Result<()> {
    socket
        .send(WsMessage::Text(value.to_string()))
        .await
        .context("websocket send failed")
}

/// Receive the next text frame as JSON, with a timeout. Non-text frames
/// (pings and pongs) are skipped.
pub async fn recv_json(socket: &mut WsClient) -> Result<serde_json::Value> {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, socket.next())
            .await
            .context("timed out waiting for a frame")?
            .context("connection closed")??;
        match frame {
            WsMessage::Text(text) => return Ok(serde_json::from_str(&text)?),
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => anyhow::bail!("unexpected frame: {other:?}"),
        }
    }
}

/// The HTTP status of a failed WebSocket handshake.
pub async fn ws_reject_status(server: &TestServer, path: &str) -> Result<u16> {
    match connect_async(server.ws_url(path)).await {
        Ok(_) => anyhow::bail!("handshake unexpectedly succeeded"),
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            Ok(response.status().as_u16())
        }
        Err(other) => anyhow::bail!("unexpected handshake error: {other}"),
    }
}
