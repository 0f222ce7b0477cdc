//! Codepics Shared - wire types for the player client
//!
//! This crate contains every type that crosses the wire:
//! - Game state mirror types (`GameState`, `Teams`, `CardInfo`, ...)
//! - Socket event types (`ClientMessage`, `ServerMessage`)
//! - HTTP response bodies for the lobby endpoints
//! - Socket.IO / Engine.IO text framing
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Trust the server** - Payloads are mirrored verbatim, no local validation

pub mod messages;
pub mod responses;
pub mod socketio;
pub mod types;

pub use messages::{ClientMessage, GameUpdate, HostUpdate, ServerMessage, SpymasterVision};
pub use responses::{CardCollections, GameList, LobbyInfo, LobbyState};
pub use socketio::{EnginePacket, Handshake, ProtocolError, SocketPacket};
pub use types::{
    CardIndex, CardInfo, CardTeam, GameId, GameState, PlayState, PlayerInfo, Team, TeamInfo, Teams,
};
