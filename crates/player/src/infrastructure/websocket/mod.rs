//! Socket.IO client for the game server
//!
//! - `core`: reconnect policy and backoff
//! - `shared`: endpoint construction, frame parsing, transport errors
//! - `client`: the tokio-tungstenite connection loop
//! - `bridge`: wires the client to the command and event buses

mod bridge;
mod client;
mod core;
mod shared;

pub use bridge::{create_connection, Connection};
pub use client::SocketClient;
pub use core::{BackoffState, ReconnectPolicy};
pub use shared::{parse_frame, socket_endpoint, FrameError, ParsedFrame, TransportError};
