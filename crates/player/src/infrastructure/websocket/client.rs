//! Socket.IO client over tokio-tungstenite

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use codepics_shared::{
    ClientMessage, EnginePacket, Handshake, ProtocolError, ServerMessage, SocketPacket,
};

use super::core::{BackoffState, ReconnectPolicy};
use super::shared::{parse_frame, socket_endpoint, ParsedFrame, TransportError};
use crate::infrastructure::messaging::{ConnectionState, ConnectionStateCell};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type MessageCallback = Box<dyn Fn(ServerMessage) + Send + Sync>;

/// How a live connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    /// `disconnect()` was called
    Intentional,
    /// Server sent a namespace disconnect; the server does not want us back
    ServerDisconnect,
    /// Transport dropped, engine close, or heartbeat silence
    Lost,
}

/// Socket.IO client for the game server.
///
/// `run()` owns the connection and reconnect loop; `send()` and `disconnect()`
/// may be called from any clone while it runs.
#[derive(Clone)]
pub struct SocketClient {
    endpoint: Url,
    policy: ReconnectPolicy,
    state: ConnectionStateCell,
    /// Writer channel of the live connection, `None` while disconnected
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>,
    /// Frames emitted while disconnected, flushed after the next connect
    send_buffer: Arc<Mutex<Vec<String>>>,
    on_message: Arc<Mutex<Option<MessageCallback>>>,
    intentional_disconnect: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl SocketClient {
    pub fn new(
        base_url: &Url,
        policy: ReconnectPolicy,
        state: ConnectionStateCell,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            endpoint: socket_endpoint(base_url)?,
            policy,
            state,
            tx: Arc::new(Mutex::new(None)),
            send_buffer: Arc::new(Mutex::new(Vec::new())),
            on_message: Arc::new(Mutex::new(None)),
            intentional_disconnect: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn set_on_message<F>(&self, callback: F)
    where
        F: Fn(ServerMessage) + Send + Sync + 'static,
    {
        let mut on_message = self.on_message.lock().await;
        *on_message = Some(Box::new(callback));
    }

    /// Connect and keep the connection up until `disconnect()` or the
    /// reconnect policy gives up.
    pub async fn run(&self) {
        let mut backoff = BackoffState::new(self.policy);

        loop {
            if self.intentional_disconnect.load(Ordering::SeqCst) {
                self.state.set(ConnectionState::Disconnected);
                return;
            }

            let result = self.connect_internal().await;
            {
                let mut tx = self.tx.lock().await;
                *tx = None;
            }

            let failed = match result {
                Ok(CloseReason::Intentional) => {
                    tracing::info!("Disconnected from game server");
                    self.state.set(ConnectionState::Disconnected);
                    return;
                }
                Ok(CloseReason::ServerDisconnect) => {
                    tracing::info!("Server closed the session, not reconnecting");
                    self.state.set(ConnectionState::Disconnected);
                    return;
                }
                Ok(CloseReason::Lost) => {
                    tracing::warn!("Connection to game server lost");
                    backoff.reset();
                    false
                }
                Err(e) => {
                    tracing::warn!(attempt = backoff.attempts(), "Connection attempt failed: {}", e);
                    true
                }
            };

            if self.intentional_disconnect.load(Ordering::SeqCst) {
                self.state.set(ConnectionState::Disconnected);
                return;
            }

            let Some(delay) = backoff.next_delay_and_advance() else {
                if self.policy.enabled {
                    tracing::error!("Max reconnection attempts reached, giving up");
                }
                self.state.set(if failed {
                    ConnectionState::Failed
                } else {
                    ConnectionState::Disconnected
                });
                return;
            };

            self.state.set(ConnectionState::Reconnecting);
            tracing::info!(
                "Reconnection attempt {} of {}, waiting {}ms",
                backoff.attempts(),
                self.policy.max_attempts,
                delay.as_millis()
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.notified() => {
                    tracing::info!("Reconnection cancelled - intentional disconnect");
                }
            }
        }
    }

    /// Engine.IO open, then namespace connect.
    async fn open_session(&self) -> Result<(WsStream, Handshake), TransportError> {
        let (mut ws, _) = connect_async(self.endpoint.as_str()).await?;

        let handshake = match ws.next().await {
            Some(Ok(Message::Text(text))) => match EnginePacket::decode(&text)? {
                EnginePacket::Open(handshake) => handshake,
                other => {
                    return Err(TransportError::Handshake(format!(
                        "expected open packet, got {other:?}"
                    )))
                }
            },
            Some(Ok(other)) => {
                return Err(TransportError::Handshake(format!(
                    "unexpected frame before open packet: {other:?}"
                )))
            }
            Some(Err(e)) => return Err(e.into()),
            None => {
                return Err(TransportError::Handshake(
                    "closed before open packet".to_string(),
                ))
            }
        };

        ws.send(Message::Text(SocketPacket::connect().to_frame()?))
            .await?;

        loop {
            let text = match tokio::time::timeout(handshake.heartbeat_deadline(), ws.next()).await
            {
                Err(_) => {
                    return Err(TransportError::Handshake(
                        "timed out waiting for namespace connect".to_string(),
                    ))
                }
                Ok(Some(Ok(Message::Text(text)))) => text,
                Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                    return Err(TransportError::Handshake(
                        "closed during namespace connect".to_string(),
                    ))
                }
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => return Err(e.into()),
            };

            match EnginePacket::decode(&text)? {
                EnginePacket::Ping(data) => {
                    ws.send(Message::Text(EnginePacket::Pong(data).encode()?))
                        .await?;
                }
                EnginePacket::Message(body) => match SocketPacket::decode(&body)? {
                    SocketPacket::Connect { .. } => break,
                    SocketPacket::ConnectError { data, .. } => {
                        return Err(TransportError::ConnectRefused(
                            data.map(|d| d.to_string()).unwrap_or_default(),
                        ))
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        Ok((ws, handshake))
    }

    /// One connection, from handshake until it closes.
    async fn connect_internal(&self) -> Result<CloseReason, TransportError> {
        self.state.set(ConnectionState::Connecting);

        let (ws, handshake) = tokio::select! {
            session = self.open_session() => session?,
            _ = self.shutdown.notified() => return Ok(CloseReason::Intentional),
        };

        let (mut write, mut read) = ws.split();

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        {
            let mut tx_lock = self.tx.lock().await;
            let mut buffer = self.send_buffer.lock().await;
            if !buffer.is_empty() {
                tracing::debug!("Flushing {} buffered emits", buffer.len());
            }
            for frame in buffer.drain(..) {
                let _ = tx.send(frame);
            }
            *tx_lock = Some(tx);
        }

        if self.intentional_disconnect.load(Ordering::SeqCst) {
            let mut tx_lock = self.tx.lock().await;
            *tx_lock = None;
        }

        tracing::info!(sid = %handshake.sid, "Connected to game server at {}", self.endpoint);
        self.state.set(ConnectionState::Connected);

        let deadline = handshake.heartbeat_deadline();
        let mut last_seen = Instant::now();

        let reason = loop {
            tokio::select! {
                outgoing = rx.recv() => match outgoing {
                    Some(frame) => {
                        if let Err(e) = write.send(Message::Text(frame)).await {
                            tracing::error!("Failed to send message: {}", e);
                            break CloseReason::Lost;
                        }
                    }
                    None => {
                        let _ = write
                            .send(Message::Text(SocketPacket::disconnect().to_frame()?))
                            .await;
                        let _ = write.close().await;
                        break CloseReason::Intentional;
                    }
                },
                incoming = read.next() => {
                    last_seen = Instant::now();
                    match incoming {
                        Some(Ok(Message::Text(text))) => match parse_frame(&text) {
                            Ok(ParsedFrame::Ping(data)) => {
                                let pong = EnginePacket::Pong(data).encode()?;
                                if let Err(e) = write.send(Message::Text(pong)).await {
                                    tracing::error!("Failed to answer heartbeat: {}", e);
                                    break CloseReason::Lost;
                                }
                            }
                            Ok(ParsedFrame::Event(message)) => {
                                let callback = self.on_message.lock().await;
                                if let Some(ref cb) = *callback {
                                    cb(*message);
                                }
                            }
                            Ok(ParsedFrame::ServerDisconnect) => break CloseReason::ServerDisconnect,
                            Ok(ParsedFrame::Close) => break CloseReason::Lost,
                            Ok(ParsedFrame::Ignore) => {}
                            Err(e) => {
                                tracing::warn!("Dropping malformed frame: {}", e);
                            }
                        },
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::info!("Server closed connection");
                            break CloseReason::Lost;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("WebSocket error: {}", e);
                            break CloseReason::Lost;
                        }
                    }
                }
                _ = tokio::time::sleep_until(last_seen + deadline) => {
                    tracing::warn!(
                        "No heartbeat for {}ms, dropping connection",
                        deadline.as_millis()
                    );
                    break CloseReason::Lost;
                }
            }
        };

        Ok(reason)
    }

    /// Emit one event.
    ///
    /// While disconnected the frame is buffered and sent right after the next
    /// namespace connect.
    pub async fn send(&self, message: &ClientMessage) -> Result<(), TransportError> {
        let payload = message.payload().map_err(ProtocolError::from)?;
        let frame = SocketPacket::event(message.event_name(), payload).to_frame()?;

        let mut tx_lock = self.tx.lock().await;
        let unsent = match tx_lock.as_ref() {
            Some(tx) => tx.send(frame).err().map(|e| e.0),
            None => Some(frame),
        };
        if let Some(frame) = unsent {
            *tx_lock = None;
            tracing::debug!(event = message.event_name(), "Not connected, buffering emit");
            self.send_buffer.lock().await.push(frame);
        }
        Ok(())
    }

    /// Close the connection (if any) and stop reconnecting.
    pub async fn disconnect(&self) {
        self.intentional_disconnect.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();

        let mut tx_lock = self.tx.lock().await;
        let mut buffer = self.send_buffer.lock().await;
        if !buffer.is_empty() {
            tracing::debug!("Dropping {} buffered emits on disconnect", buffer.len());
            buffer.clear();
        }
        *tx_lock = None;
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }
}
