//! Codepics player client.
//!
//! - `GameEvents` keeps a live socket to the game server and mirrors the game
//!   into a `GameStore`
//! - `QueryClient` / `LobbyService` cover the HTTP lobby endpoints
//! - `config` and `routes` feed the headless runner binary

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod routes;
pub mod state;

// Re-export commonly used entrypoints
pub use application::{GameEvents, LobbyService};
pub use config::{ClientConfig, ConfigError, RunnerConfig};
pub use infrastructure::http_client::QueryClient;
pub use infrastructure::messaging::{CommandError, ConnectionState, ConnectionStateObserver};
pub use infrastructure::websocket::{ReconnectPolicy, TransportError};
pub use ports::outbound::{QueryError, QueryPort};
pub use routes::Route;
pub use state::{GameStore, ServerNotice};
