//! Application layer: the game events façade, the inbound event handler and
//! the lobby service.

pub mod event_handler;
pub mod game_events;
pub mod lobby_service;

pub use event_handler::handle_server_message;
pub use game_events::GameEvents;
pub use lobby_service::{LobbyService, PING_REPLY};
