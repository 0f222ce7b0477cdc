//! Command Bus and Event Bus messaging infrastructure.
//!
//! - `CommandBus`: send fire-and-forget events to the server
//! - `EventBus`: fan inbound (and, for diagnostics, outbound) events out to subscribers
//! - `ConnectionHandle`: manage connection lifecycle
//!
//! The WebSocket bridge (in the websocket module) connects these buses to the actual transport.

pub mod command_bus;
pub mod connection;
pub mod event_bus;

pub use command_bus::{CommandBus, CommandError};
pub use connection::{
    ConnectionHandle, ConnectionState, ConnectionStateCell, ConnectionStateObserver,
};
pub use event_bus::EventBus;
