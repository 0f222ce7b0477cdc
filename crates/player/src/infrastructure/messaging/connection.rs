//! Connection lifecycle management.
//!
//! The transport publishes its state into a shared [`ConnectionStateCell`];
//! callers read it through a [`ConnectionHandle`] (which can also request a
//! disconnect) or any number of [`ConnectionStateObserver`]s.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{oneshot, watch};

/// Connection state of the game socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the server
    #[default]
    Disconnected,
    /// Attempting to establish connection
    Connecting,
    /// Handshake and namespace connect completed
    Connected,
    /// Connection lost, waiting before the next attempt
    Reconnecting,
    /// Gave up (connect failed and retries exhausted or disabled)
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, observable connection state written by the transport.
#[derive(Clone)]
pub struct ConnectionStateCell {
    tx: Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionStateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Disconnected);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Store a new state. Observers are only woken on an actual change.
    pub fn set(&self, new_state: ConnectionState) {
        let previous = self.tx.send_replace(new_state);
        if previous != new_state {
            tracing::debug!(from = %previous, to = %new_state, "Connection state changed");
        }
    }

    pub fn observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ConnectionStateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to manage connection lifecycle.
///
/// Dropping the handle disconnects as well; the bridge treats a closed
/// signal channel the same as an explicit `disconnect()`.
pub struct ConnectionHandle {
    state: ConnectionStateCell,
    disconnect_tx: Option<oneshot::Sender<()>>,
}

impl ConnectionHandle {
    /// Called by the bridge when spawning the connection task.
    pub fn new(state: ConnectionStateCell, disconnect_tx: oneshot::Sender<()>) -> Self {
        Self {
            state,
            disconnect_tx: Some(disconnect_tx),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Ask the bridge task to close the connection and stop reconnecting.
    ///
    /// The close happens asynchronously; watch an observer to see it land.
    pub fn disconnect(mut self) {
        if let Some(tx) = self.disconnect_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn observer(&self) -> ConnectionStateObserver {
        self.state.observer()
    }
}

/// Read-only view of the connection state, cheap to clone.
#[derive(Clone)]
pub struct ConnectionStateObserver {
    rx: watch::Receiver<ConnectionState>,
}

impl ConnectionStateObserver {
    pub fn state(&self) -> ConnectionState {
        *self.rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Wait until the state satisfies `predicate`.
    ///
    /// Returns `None` if the transport side was dropped first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(ConnectionState) -> bool,
    ) -> Option<ConnectionState> {
        self.rx
            .wait_for(|state| predicate(*state))
            .await
            .ok()
            .map(|state| *state)
    }
}
