//! Messaging client
//!
//! `MessagingClient` talks to a postbox server over WebSockets. Every call
//! opens a connection, sends one request frame, waits for the single reply
//! and closes the connection again.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::EventKind;
use crate::transport::{ClientRequest, ServerResponse};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("invalid response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("connection closed before a response arrived")]
    ConnectionClosed,
}

#[derive(Debug, Clone)]
pub struct MessagingClient {
    url: String,
}

impl MessagingClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deposit `body` for `to`. Topic messages need `timeout_secs`.
    pub async fn post(
        &self,
        kind: EventKind,
        to: &str,
        body: &str,
        timeout_secs: Option<u64>,
    ) -> Result<ServerResponse, ClientError> {
        self.request(&ClientRequest::write(kind, to, body, timeout_secs))
            .await
    }

    /// Read one message, or every message when `all` is set.
    pub async fn fetch(
        &self,
        kind: EventKind,
        to: &str,
        all: bool,
    ) -> Result<ServerResponse, ClientError> {
        self.request(&ClientRequest::read(kind, to, all)).await
    }

    pub async fn request(&self, request: &ClientRequest) -> Result<ServerResponse, ClientError> {
        let (mut ws_stream, _response) = connect_async(self.url.as_str()).await?;

        let frame = serde_json::to_string(request)?;
        debug!("sending {frame} to {}", self.url);
        ws_stream.send(WsMessage::text(frame)).await?;

        while let Some(msg) = ws_stream.next().await {
            let msg = msg?;
            if msg.is_text() {
                let response: ServerResponse = serde_json::from_str(msg.to_text()?)?;
                let _ = ws_stream.close(None).await;
                return Ok(response);
            }
            if msg.is_close() {
                break;
            }
        }

        Err(ClientError::ConnectionClosed)
    }
}
