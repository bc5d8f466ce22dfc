//! WebSocket transport
//!
//! Minimal WebSocket server in front of the broker. Responsibilities:
//! - Accept TCP/WebSocket connections, one task per connection
//! - Answer every text frame with exactly one JSON `ServerResponse`
//! - Leave validation and status mapping to the adapter
//!
//! Replies go through a per-connection channel drained by a writer task, so
//! the read loop never waits on socket writes.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::broker::Broker;
use crate::transport::adapter;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Bind `addr` and serve until the listener fails.
pub async fn start_websocket_server(addr: &str, broker: Arc<Broker>) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);
    serve(listener, broker).await
}

/// Accept connections on an already bound listener.
pub async fn serve(listener: TcpListener, broker: Arc<Broker>) -> io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let broker = broker.clone();
                spawn(handle_connection(stream, peer, broker));
            }
            Err(e) => {
                // per-connection failures (e.g. EMFILE) should not stop the server
                warn!("failed to accept connection: {e}");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, broker: Arc<Broker>) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake error from {peer}: {e}");
            return;
        }
    };

    let connection_id = format!("conn-{}", Uuid::new_v4());
    info!("{connection_id} connected from {peer}");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    let writer = {
        let connection_id = connection_id.clone();
        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!("Failed to send response to {connection_id}: {e}");
                    break;
                }
            }
            let _ = ws_sender.close().await;
        })
    };

    while let Some(frame) = ws_receiver.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                debug!("{connection_id} read error: {e}");
                break;
            }
        };

        if msg.is_close() {
            break;
        }
        if !msg.is_text() {
            continue;
        }

        let Ok(text) = msg.to_text() else { continue };
        let response = adapter::handle_frame(&broker, text);
        debug!("{connection_id} -> {}", response.status);

        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize response: {e}");
                continue;
            }
        };
        if tx.send(WsMessage::text(json)).is_err() {
            break;
        }
    }

    drop(tx);
    let _ = writer.await;
    info!("{connection_id} disconnected");
}
