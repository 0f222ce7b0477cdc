//! Socket.IO v4 text framing.
//!
//! A websocket text frame carries one Engine.IO packet: a single type digit
//! followed by its body. Engine.IO `message` packets wrap one Socket.IO packet:
//!
//! ```text
//! <type>[<namespace>,][<ack id>][<json data>]
//! ```
//!
//! so an event on the default namespace reads `42["update_game",{...}]`.
//! Binary attachments (Socket.IO types 5 and 6) are not supported.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Engine.IO protocol revision requested in the `EIO` query parameter.
pub const ENGINE_IO_VERSION: u8 = 4;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty packet")]
    Empty,
    #[error("unknown packet type {0:?}")]
    UnknownPacketType(char),
    #[error("binary packets are not supported")]
    UnsupportedBinary,
    #[error("malformed packet: {0}")]
    Malformed(String),
    #[error("invalid packet JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body of the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Longest silence tolerated before the connection counts as lost.
    pub fn heartbeat_deadline(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

// =============================================================================
// Engine.IO
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    /// Carries an encoded [`SocketPacket`]
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let body = chars.as_str();

        Ok(match kind {
            '0' => EnginePacket::Open(serde_json::from_str(body)?),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(body.to_string()),
            '3' => EnginePacket::Pong(body.to_string()),
            '4' => EnginePacket::Message(body.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            other => return Err(ProtocolError::UnknownPacketType(other)),
        })
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(match self {
            EnginePacket::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        })
    }
}

// =============================================================================
// Socket.IO
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    /// `args[0]` is the event name
    Event {
        namespace: String,
        id: Option<u64>,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Connect request for the default namespace.
    pub fn connect() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    pub fn disconnect() -> Self {
        SocketPacket::Disconnect {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Fire-and-forget event on the default namespace.
    pub fn event(name: &str, payload: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            id: None,
            args: vec![Value::String(name.to_string()), payload],
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    /// Event name and its first argument (`null` when the event has none).
    pub fn into_event(self) -> Option<(String, Value)> {
        let SocketPacket::Event { args, .. } = self else {
            return None;
        };
        let mut args = args.into_iter();
        let name = match args.next() {
            Some(Value::String(name)) => name,
            _ => return None,
        };
        Some((name, args.next().unwrap_or(Value::Null)))
    }

    pub fn decode(body: &str) -> Result<Self, ProtocolError> {
        let mut chars = body.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        if matches!(kind, '5' | '6') {
            return Err(ProtocolError::UnsupportedBinary);
        }
        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            let (namespace, tail) = rest.split_once(',').unwrap_or((rest, ""));
            rest = tail;
            namespace.to_string()
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let id = if digits > 0 {
            let id = rest[..digits]
                .parse::<u64>()
                .map_err(|e| ProtocolError::Malformed(format!("ack id: {e}")))?;
            Some(id)
        } else {
            None
        };
        rest = &rest[digits..];

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(rest)?)
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let args = into_args(data)?;
                if !args.first().is_some_and(Value::is_string) {
                    return Err(ProtocolError::Malformed("event without a name".into()));
                }
                Ok(SocketPacket::Event {
                    namespace,
                    id,
                    args,
                })
            }
            '3' => Ok(SocketPacket::Ack {
                namespace,
                id: id.ok_or_else(|| ProtocolError::Malformed("ack without id".into()))?,
                args: into_args(data)?,
            }),
            '4' => Ok(SocketPacket::ConnectError { namespace, data }),
            other => Err(ProtocolError::UnknownPacketType(other)),
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        let (kind, id, data) = match self {
            SocketPacket::Connect { data, .. } => ('0', None, data.clone()),
            SocketPacket::Disconnect { .. } => ('1', None, None),
            SocketPacket::Event { id, args, .. } => ('2', *id, Some(Value::Array(args.clone()))),
            SocketPacket::Ack { id, args, .. } => ('3', Some(*id), Some(Value::Array(args.clone()))),
            SocketPacket::ConnectError { data, .. } => ('4', None, data.clone()),
        };

        let mut out = String::new();
        out.push(kind);
        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = data {
            out.push_str(&serde_json::to_string(&data)?);
        }
        Ok(out)
    }

    /// Wrap into the websocket text frame that carries this packet.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        EnginePacket::Message(self.encode()?).encode()
    }
}

fn into_args(data: Option<Value>) -> Result<Vec<Value>, ProtocolError> {
    match data {
        Some(Value::Array(args)) => Ok(args),
        Some(other) => Err(ProtocolError::Malformed(format!(
            "expected argument array, got {other}"
        ))),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn open_packet_decodes_handshake() {
        let frame = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(handshake) = EnginePacket::decode(frame).expect("decode") else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.heartbeat_deadline(), Duration::from_millis(45_000));
        assert_eq!(handshake.max_payload, Some(1_000_000));
    }

    #[test]
    fn engine_control_packets() {
        assert_eq!(EnginePacket::decode("2").expect("ping"), EnginePacket::Ping(String::new()));
        assert_eq!(EnginePacket::decode("3probe").expect("pong"), EnginePacket::Pong("probe".into()));
        assert_eq!(EnginePacket::decode("1").expect("close"), EnginePacket::Close);
        assert_eq!(EnginePacket::decode("6").expect("noop"), EnginePacket::Noop);
        assert_eq!(EnginePacket::Pong(String::new()).encode().expect("encode"), "3");
        assert!(matches!(EnginePacket::decode(""), Err(ProtocolError::Empty)));
        assert!(matches!(
            EnginePacket::decode("9"),
            Err(ProtocolError::UnknownPacketType('9'))
        ));
    }

    #[test]
    fn event_frame_decodes() {
        let EnginePacket::Message(body) =
            EnginePacket::decode(r#"42["who_is_host",{"is_host":true}]"#).expect("decode")
        else {
            panic!("expected message packet");
        };
        let packet = SocketPacket::decode(&body).expect("decode");
        assert_eq!(packet.namespace(), "/");
        let (name, payload) = packet.into_event().expect("event");
        assert_eq!(name, "who_is_host");
        assert_eq!(payload, json!({"is_host": true}));
    }

    #[test]
    fn event_with_namespace_and_ack_id() {
        let packet = SocketPacket::decode(r#"2/admin,12["ping",1]"#).expect("decode");
        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/admin".into(),
                id: Some(12),
                args: vec![json!("ping"), json!(1)],
            }
        );
        assert_eq!(packet.encode().expect("encode"), r#"2/admin,12["ping",1]"#);
    }

    #[test]
    fn event_without_payload_yields_null() {
        let packet = SocketPacket::decode(r#"2["debug_leave_all"]"#).expect("decode");
        assert_eq!(
            packet.into_event(),
            Some(("debug_leave_all".to_string(), Value::Null))
        );
    }

    #[test]
    fn connect_and_errors() {
        assert_eq!(SocketPacket::connect().to_frame().expect("frame"), "40");
        assert_eq!(SocketPacket::disconnect().to_frame().expect("frame"), "41");

        let ack = SocketPacket::decode(r#"0{"sid":"xyz"}"#).expect("decode");
        assert_eq!(
            ack,
            SocketPacket::Connect {
                namespace: "/".into(),
                data: Some(json!({"sid": "xyz"})),
            }
        );

        let refused = SocketPacket::decode(r#"4{"message":"Not authorized"}"#).expect("decode");
        assert!(matches!(refused, SocketPacket::ConnectError { .. }));
    }

    #[test]
    fn outbound_event_frame() {
        let frame = SocketPacket::event("leave", json!({"game_id": 2}))
            .to_frame()
            .expect("frame");
        assert_eq!(frame, r#"42["leave",{"game_id":2}]"#);
    }

    #[test]
    fn rejects_binary_and_malformed_events() {
        assert!(matches!(
            SocketPacket::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#),
            Err(ProtocolError::UnsupportedBinary)
        ));
        assert!(matches!(
            SocketPacket::decode(r#"2{"not":"an array"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            SocketPacket::decode("2[1,2]"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            SocketPacket::decode("3[]"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(SocketPacket::decode("2[oops"), Err(ProtocolError::Json(_))));
    }
}
