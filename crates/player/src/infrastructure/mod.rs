pub mod http_client;
pub mod messaging;
pub mod websocket;

pub mod testing;

// Re-export messaging types
pub use http_client::QueryClient;
pub use messaging::{CommandBus, ConnectionState, EventBus};
