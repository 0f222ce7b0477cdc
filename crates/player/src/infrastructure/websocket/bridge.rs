//! WebSocket Bridge - connects CommandBus/EventBus to the SocketClient.
//!
//! `create_connection` sets up:
//! - A CommandBus for emitting events
//! - A background task that feeds server events to the inbound EventBus, in
//!   arrival order, and mirrors every emit onto the outbound EventBus
//! - A ConnectionHandle and observer for the transport state

use codepics_shared::{ClientMessage, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use url::Url;

use super::client::SocketClient;
use super::core::ReconnectPolicy;
use super::shared::TransportError;
use crate::infrastructure::messaging::{
    CommandBus, ConnectionHandle, ConnectionStateCell, ConnectionStateObserver, EventBus,
};

/// Result of creating a connection.
///
/// - `command_bus`: emit events to the server
/// - `handle`: control connection lifecycle
/// - `state_observer`: observe connection state
pub struct Connection {
    pub command_bus: CommandBus,
    pub handle: ConnectionHandle,
    pub state_observer: ConnectionStateObserver,
}

/// Open a socket to `base_url` and start the bridge task.
///
/// Subscribers registered on `inbound` before this call see every server
/// event from the first one on.
pub fn create_connection(
    base_url: &Url,
    policy: ReconnectPolicy,
    inbound: EventBus<ServerMessage>,
    outbound: EventBus<ClientMessage>,
) -> Result<Connection, TransportError> {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let (disconnect_tx, disconnect_rx) = oneshot::channel::<()>();

    let state = ConnectionStateCell::new();
    let client = SocketClient::new(base_url, policy, state.clone())?;
    tracing::debug!("Opening socket at {}", client.endpoint());

    tokio::spawn(bridge_task(client, cmd_rx, disconnect_rx, inbound, outbound));

    Ok(Connection {
        command_bus: CommandBus::new(cmd_tx),
        state_observer: state.observer(),
        handle: ConnectionHandle::new(state, disconnect_tx),
    })
}

async fn bridge_task(
    client: SocketClient,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    mut disconnect_rx: oneshot::Receiver<()>,
    inbound: EventBus<ServerMessage>,
    outbound: EventBus<ClientMessage>,
) {
    // The reader only enqueues; dispatch happens here, one event at a time
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerMessage>();
    client
        .set_on_message(move |msg| {
            let _ = event_tx.send(msg);
        })
        .await;

    let transport = client.clone();
    let mut transport_task: Option<JoinHandle<()>> =
        Some(tokio::spawn(async move { transport.run().await }));

    loop {
        tokio::select! {
            biased;

            Some(msg) = event_rx.recv() => {
                inbound.dispatch(msg).await;
            }

            // Commands queued before a disconnect still go out
            Some(msg) = cmd_rx.recv() => {
                if let Err(e) = client.send(&msg).await {
                    tracing::error!(event = msg.event_name(), "Failed to emit: {}", e);
                    continue;
                }
                outbound.dispatch(msg).await;
            }

            // Explicit disconnect, or the handle was dropped
            _ = &mut disconnect_rx => {
                tracing::info!("Disconnect requested");
                client.disconnect().await;
                break;
            }

            result = async {
                match transport_task.as_mut() {
                    Some(task) => task.await,
                    None => std::future::pending().await,
                }
            } => {
                transport_task = None;
                if let Err(e) = result {
                    tracing::error!("Transport task failed: {}", e);
                }
                tracing::info!("Transport stopped, closing bridge");
                break;
            }

            else => break,
        }
    }

    if let Some(task) = transport_task.take() {
        if let Err(e) = task.await {
            tracing::error!("Transport task failed: {}", e);
        }
    }

    // Events read before the socket closed still reach subscribers
    while let Ok(msg) = event_rx.try_recv() {
        inbound.dispatch(msg).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::messaging::ConnectionState;

    #[tokio::test]
    async fn test_bridge_closes_after_transport_gives_up() {
        let base = Url::parse("http://127.0.0.1:9/").expect("url");
        let connection = create_connection(
            &base,
            ReconnectPolicy::disabled(),
            EventBus::new(),
            EventBus::new(),
        )
        .expect("connection");

        let mut observer = connection.state_observer.clone();
        let reached = observer
            .wait_for(|state| state == ConnectionState::Failed)
            .await;
        assert_eq!(reached, Some(ConnectionState::Failed));

        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while connection.command_bus.is_open() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("bridge closed");
    }

    #[test]
    fn test_rejects_unsupported_scheme() {
        let base = Url::parse("ftp://example.com/").expect("url");
        let result = create_connection(
            &base,
            ReconnectPolicy::default(),
            EventBus::new(),
            EventBus::new(),
        );
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }
}
