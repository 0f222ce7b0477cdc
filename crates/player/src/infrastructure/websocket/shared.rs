//! Shared helpers for the socket client: reconnect defaults, endpoint
//! construction and frame parsing. Nothing here touches the runtime.

use codepics_shared::socketio::ENGINE_IO_VERSION;
use codepics_shared::{EnginePacket, ProtocolError, ServerMessage, SocketPacket};
use url::Url;

// Reconnection defaults
pub const INITIAL_RETRY_DELAY_MS: u64 = 1_000;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const MAX_RETRY_ATTEMPTS: u32 = 10;
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Path the Socket.IO server listens on.
pub const SOCKET_IO_PATH: &str = "socket.io/";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid socket endpoint: {0}")]
    InvalidUrl(String),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("server refused namespace connect: {0}")]
    ConnectRefused(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Build the websocket endpoint for a server base URL.
///
/// `http://host:5000/` becomes `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
pub fn socket_endpoint(base: &Url) -> Result<Url, TransportError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme `{other}`"
            )))
        }
    };

    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut endpoint = base
        .join(SOCKET_IO_PATH)
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
    endpoint
        .set_scheme(scheme)
        .map_err(|_| TransportError::InvalidUrl(format!("cannot switch to `{scheme}`")))?;
    endpoint
        .query_pairs_mut()
        .clear()
        .append_pair("EIO", &ENGINE_IO_VERSION.to_string())
        .append_pair("transport", "websocket");
    Ok(endpoint)
}

/// What the reader should do with one inbound text frame.
#[derive(Debug)]
pub enum ParsedFrame {
    /// Engine.IO ping; answer with a pong carrying the same data
    Ping(String),
    Event(Box<ServerMessage>),
    /// Server dropped us from the namespace
    ServerDisconnect,
    /// Engine.IO close
    Close,
    /// Nothing to do (noop, pong, acks, other namespaces)
    Ignore,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("bad `{event}` payload: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn parse_frame(text: &str) -> Result<ParsedFrame, FrameError> {
    let body = match EnginePacket::decode(text)? {
        EnginePacket::Ping(data) => return Ok(ParsedFrame::Ping(data)),
        EnginePacket::Close => return Ok(ParsedFrame::Close),
        EnginePacket::Message(body) => body,
        EnginePacket::Open(_)
        | EnginePacket::Pong(_)
        | EnginePacket::Upgrade
        | EnginePacket::Noop => return Ok(ParsedFrame::Ignore),
    };

    let packet = SocketPacket::decode(&body)?;
    if packet.namespace() != codepics_shared::socketio::DEFAULT_NAMESPACE {
        return Ok(ParsedFrame::Ignore);
    }

    match packet {
        SocketPacket::Disconnect { .. } => Ok(ParsedFrame::ServerDisconnect),
        packet @ SocketPacket::Event { .. } => {
            let Some((event, payload)) = packet.into_event() else {
                return Ok(ParsedFrame::Ignore);
            };
            let message = ServerMessage::from_event(&event, payload)
                .map_err(|source| FrameError::Payload { event, source })?;
            Ok(ParsedFrame::Event(Box::new(message)))
        }
        _ => Ok(ParsedFrame::Ignore),
    }
}
