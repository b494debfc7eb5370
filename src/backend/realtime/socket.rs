/**
 * WebSocket Transport
 *
 * `GET /ws` upgrades to a WebSocket and runs one connection:
 *
 * - the reader loop decodes text frames into `ClientEvent`s and queues them
 *   on the relay, in order
 * - a writer task drains the connection's outbound channel and encodes each
 *   `ServerEvent` as a text frame
 * - a keepalive task pings the client and closes the socket when a pong
 *   does not come back in time
 *
 * Malformed frames are logged and dropped; nothing is sent back. When the
 * reader loop ends for any reason the relay gets exactly one disconnect.
 */

use std::time::Duration;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant};

use crate::backend::auth::HandshakePolicy;
use crate::backend::error::BackendError;
use crate::backend::realtime::actor::RelayHandle;
use crate::backend::realtime::connection::{ConnectionId, ConnectionReceiver};
use crate::shared::{ClientEvent, RelayConfig};

/// How long a closing connection waits for its writer to flush
const WRITER_GRACE: Duration = Duration::from_secs(1);

/// Query string accepted on the upgrade request
#[derive(Debug, Default, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Transport keepalive settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keepalive {
    /// Ping period; zero disables pings
    pub ping_interval: Duration,
    /// How long a pong may take
    pub pong_timeout: Duration,
}

impl Keepalive {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            ping_interval: config.ping_interval,
            pong_timeout: config.pong_timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            ping_interval: Duration::ZERO,
            pong_timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ping_interval.is_zero()
    }
}

/// GET /ws
///
/// Under a token-requiring handshake policy the request is rejected with
/// 401 before the upgrade when the token is missing or invalid.
pub async fn ws_upgrade(
    State(relay): State<RelayHandle>,
    State(handshake): State<HandshakePolicy>,
    State(keepalive): State<Keepalive>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    let verified_identity = handshake
        .authorize(&headers, query.token.as_deref())
        .inspect_err(|e| tracing::warn!("[Socket] Handshake refused: {}", e))?;

    if let Some(identity) = &verified_identity {
        tracing::debug!(user_id = %identity, "[Socket] Handshake verified");
    }

    Ok(ws.on_upgrade(move |socket| run_connection(socket, relay, keepalive, verified_identity)))
}

/// Drive one upgraded socket until it closes
pub async fn run_connection(
    socket: WebSocket,
    relay: RelayHandle,
    keepalive: Keepalive,
    verified_identity: Option<String>,
) {
    let (connection, events) = match relay.connect(verified_identity).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!("[Socket] Could not register connection: {}", e);
            let mut socket = socket;
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AGAIN,
                    reason: "Relay unavailable".into(),
                })))
                .await;
            return;
        }
    };

    let (ws_sender, mut ws_receiver) = socket.split();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();
    let (pong_tx, pong_rx) = mpsc::unbounded_channel::<()>();
    let (dead_tx, mut dead_rx) = mpsc::unbounded_channel::<()>();

    tracing::info!(connection = %connection, "[Socket] Connected");

    let writer_handle = tokio::spawn(writer_task(connection, ws_sender, events, control_rx));
    let ping_handle = keepalive.is_enabled().then(|| {
        tokio::spawn(ping_task(
            connection,
            keepalive,
            control_tx.clone(),
            pong_rx,
            dead_tx,
        ))
    });

    loop {
        let frame = tokio::select! {
            frame = ws_receiver.next() => frame,
            Some(()) = dead_rx.recv() => {
                tracing::warn!(connection = %connection, "[Socket] Pong timeout, closing");
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => match ClientEvent::decode(text.as_str()) {
                Ok(event) => {
                    tracing::debug!(
                        connection = %connection,
                        recipient = ?event.recipient(),
                        "[Socket] <- {}",
                        event.name()
                    );
                    relay.inbound(connection, event);
                }
                Err(e) => {
                    tracing::warn!(connection = %connection, "[Socket] Dropped frame: {}", e);
                }
            },
            Some(Ok(Message::Binary(data))) => {
                tracing::debug!(
                    connection = %connection,
                    "[Socket] Ignored {} byte binary frame",
                    data.len()
                );
            }
            Some(Ok(Message::Pong(_))) => {
                let _ = pong_tx.send(());
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = control_tx.send(Message::Pong(data));
            }
            Some(Ok(Message::Close(frame))) => {
                tracing::info!(connection = %connection, reason = ?frame, "[Socket] Client closed");
                break;
            }
            Some(Err(e)) => {
                tracing::warn!(connection = %connection, error = %e, "[Socket] Receive error");
                break;
            }
            None => {
                tracing::info!(connection = %connection, "[Socket] Stream ended");
                break;
            }
        }
    }

    relay.disconnect(connection);

    if let Some(handle) = ping_handle {
        handle.abort();
    }
    // give a pending close frame a chance to go out
    drop(control_tx);
    if !stop_writer(writer_handle, WRITER_GRACE).await {
        tracing::debug!(connection = %connection, "[Socket] Writer did not finish, aborted");
    }

    tracing::info!(connection = %connection, "[Socket] Disconnected");
}

/// Wait up to `grace` for the writer to finish, then abort it
///
/// Returns `false` when the writer had to be aborted. Either way the task
/// has released its half of the socket once this returns.
async fn stop_writer(mut writer_handle: JoinHandle<()>, grace: Duration) -> bool {
    if timeout(grace, &mut writer_handle).await.is_ok() {
        return true;
    }
    writer_handle.abort();
    let _ = writer_handle.await;
    false
}

async fn writer_task(
    connection: ConnectionId,
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut events: ConnectionReceiver,
    mut control: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let message = tokio::select! {
            Some(event) = events.recv() => match event.encode() {
                Ok(text) => {
                    tracing::debug!(connection = %connection, "[Socket] -> {}", event.name());
                    Message::Text(text.into())
                }
                Err(e) => {
                    tracing::error!(connection = %connection, "[Socket] Could not encode {}: {}", event.name(), e);
                    continue;
                }
            },
            Some(message) = control.recv() => message,
            else => break,
        };

        let closing = matches!(message, Message::Close(_));
        if ws_sender.send(message).await.is_err() || closing {
            break;
        }
    }
}

async fn ping_task(
    connection: ConnectionId,
    keepalive: Keepalive,
    control: mpsc::UnboundedSender<Message>,
    mut pongs: mpsc::UnboundedReceiver<()>,
    dead: mpsc::UnboundedSender<()>,
) {
    let mut ticker = interval_at(Instant::now() + keepalive.ping_interval, keepalive.ping_interval);

    loop {
        ticker.tick().await;

        // pongs that arrived late belong to an earlier ping
        while pongs.try_recv().is_ok() {}

        if control.send(Message::Ping(axum::body::Bytes::from_static(b"agora"))).is_err() {
            break;
        }

        match timeout(keepalive.pong_timeout, pongs.recv()).await {
            Ok(Some(())) => {}
            _ => {
                tracing::debug!(connection = %connection, "[Socket] No pong within {:?}", keepalive.pong_timeout);
                let _ = control.send(Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: "Pong timeout".into(),
                })));
                let _ = dead.send(());
                break;
            }
        }
    }
}
