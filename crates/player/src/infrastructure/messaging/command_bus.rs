//! Command Bus for sending events to the game server.
//!
//! Every command is fire-and-forget: the bus queues it for the bridge task and
//! returns. The server never acknowledges; its answer, if any, arrives later as
//! an ordinary inbound event.

use codepics_shared::ClientMessage;
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The bridge task is gone (connection closed for good)
    #[error("command channel closed, dropped `{event}`")]
    ChannelClosed { event: &'static str },
}

/// Command bus for sending messages to the game server.
///
/// This is a concrete struct (not a trait) that can be cloned and shared.
#[derive(Clone)]
pub struct CommandBus {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl CommandBus {
    pub fn new(tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self { tx }
    }

    /// Queue a command for the bridge. Never waits on the network.
    pub fn send(&self, message: ClientMessage) -> Result<(), CommandError> {
        let event = message.event_name();
        self.tx
            .send(message)
            .map_err(|_| CommandError::ChannelClosed { event })
    }

    /// Whether the bridge is still accepting commands.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
