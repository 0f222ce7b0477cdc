//! Game events façade - the socket side of a game session.
//!
//! Owns one connection to the game server. Outbound methods are
//! fire-and-forget emits; inbound events flow into the [`GameStore`] through
//! [`handle_server_message`]. Nothing here mutates the store directly.

use codepics_shared::{CardIndex, ClientMessage, GameId, ServerMessage, Team};

use super::event_handler::handle_server_message;
use crate::config::ClientConfig;
use crate::infrastructure::messaging::{
    CommandBus, CommandError, ConnectionHandle, ConnectionState, ConnectionStateObserver,
    EventBus,
};
use crate::infrastructure::websocket::{create_connection, Connection, TransportError};
use crate::state::GameStore;

pub struct GameEvents {
    command_bus: CommandBus,
    handle: ConnectionHandle,
    state_observer: ConnectionStateObserver,
    store: GameStore,
}

impl GameEvents {
    /// Connect to the configured server and start mirroring into `store`.
    ///
    /// Listeners are registered before the socket opens, so the first server
    /// event is already handled.
    pub async fn connect(config: &ClientConfig, store: GameStore) -> Result<Self, TransportError> {
        let (inbound, outbound) = listeners(config.dev_mode, &store).await;

        let Connection {
            command_bus,
            handle,
            state_observer,
        } = create_connection(&config.backend_url, config.reconnect, inbound, outbound)?;

        Ok(Self::from_parts(command_bus, handle, state_observer, store))
    }

    pub(crate) fn from_parts(
        command_bus: CommandBus,
        handle: ConnectionHandle,
        state_observer: ConnectionStateObserver,
        store: GameStore,
    ) -> Self {
        Self {
            command_bus,
            handle,
            state_observer,
            store,
        }
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn state(&self) -> ConnectionState {
        self.handle.state()
    }

    pub fn observer(&self) -> ConnectionStateObserver {
        self.state_observer.clone()
    }

    /// Disconnect and stop reconnecting.
    pub fn close(self) {
        self.handle.disconnect();
    }

    fn emit(&self, message: ClientMessage) -> Result<(), CommandError> {
        self.command_bus.send(message)
    }

    // =========================================================================
    // Lobby
    // =========================================================================

    pub fn join(&self, game_id: GameId, name: impl Into<String>) -> Result<(), CommandError> {
        self.emit(ClientMessage::Join {
            game_id,
            name: name.into(),
        })
    }

    pub fn leave(&self, game_id: GameId) -> Result<(), CommandError> {
        self.emit(ClientMessage::Leave { game_id })
    }

    /// Sit on `team`, as its spymaster or as an agent.
    pub fn join_team(
        &self,
        game_id: GameId,
        team: Team,
        as_spymaster: bool,
    ) -> Result<(), CommandError> {
        self.emit(ClientMessage::SwitchTeam {
            game_id,
            team,
            as_spymaster,
        })
    }

    pub fn switch_collection(
        &self,
        game_id: GameId,
        collection: impl Into<String>,
    ) -> Result<(), CommandError> {
        self.emit(ClientMessage::SwitchCollection {
            game_id,
            collection: collection.into(),
        })
    }

    pub fn start_game(&self, game_id: GameId) -> Result<(), CommandError> {
        self.emit(ClientMessage::StartGame { game_id })
    }

    pub fn reset_game(&self, game_id: GameId) -> Result<(), CommandError> {
        self.emit(ClientMessage::ResetGame { game_id })
    }

    // =========================================================================
    // Turns
    // =========================================================================

    pub fn give_hint(
        &self,
        game_id: GameId,
        hint: impl Into<String>,
        count: u32,
    ) -> Result<(), CommandError> {
        self.emit(ClientMessage::GiveHint {
            game_id,
            hint: hint.into(),
            count,
        })
    }

    pub fn vote(&self, game_id: GameId, card: CardIndex) -> Result<(), CommandError> {
        self.emit(ClientMessage::Vote { game_id, card })
    }

    pub fn reveal(&self, game_id: GameId, card: CardIndex) -> Result<(), CommandError> {
        self.emit(ClientMessage::RevealCard { game_id, card })
    }

    // =========================================================================
    // Debug (honoured only by servers running in debug mode)
    // =========================================================================

    pub fn debug_fill(&self, game_id: GameId) -> Result<(), CommandError> {
        self.emit(ClientMessage::DebugFillGame { game_id })
    }

    pub fn debug_leave_all(&self) -> Result<(), CommandError> {
        self.emit(ClientMessage::DebugLeaveAll {})
    }

    pub fn debug_give_hint(
        &self,
        game_id: GameId,
        hint: impl Into<String>,
        count: u32,
    ) -> Result<(), CommandError> {
        self.emit(ClientMessage::DebugGiveHint {
            game_id,
            hint: hint.into(),
            count,
        })
    }

    pub fn debug_vote(&self, game_id: GameId, card: CardIndex) -> Result<(), CommandError> {
        self.emit(ClientMessage::DebugVote { game_id, card })
    }

    pub fn debug_reveal(&self, game_id: GameId, card: CardIndex) -> Result<(), CommandError> {
        self.emit(ClientMessage::DebugRevealCard { game_id, card })
    }
}

/// Buses with the store handler registered, behind the dev-mode loggers when
/// `dev_mode` is set.
async fn listeners(
    dev_mode: bool,
    store: &GameStore,
) -> (EventBus<ServerMessage>, EventBus<ClientMessage>) {
    let inbound: EventBus<ServerMessage> = EventBus::new();
    let outbound: EventBus<ClientMessage> = EventBus::new();

    if dev_mode {
        inbound
            .subscribe(|event: ServerMessage| match event.payload() {
                Ok(payload) => tracing::debug!(event = event.event_name(), %payload, "<-"),
                Err(_) => tracing::debug!(event = event.event_name(), "<-"),
            })
            .await;
        outbound
            .subscribe(|event: ClientMessage| match event.payload() {
                Ok(payload) => tracing::debug!(event = event.event_name(), %payload, "->"),
                Err(_) => tracing::debug!(event = event.event_name(), "->"),
            })
            .await;
    }

    let store = store.clone();
    inbound
        .subscribe(move |event| handle_server_message(&store, event))
        .await;

    tracing::debug!(
        inbound = inbound.subscriber_count().await,
        outbound = outbound.subscriber_count().await,
        "Listeners registered"
    );
    (inbound, outbound)
}

#[cfg(test)]
mod tests {
    use codepics_shared::HostUpdate;
    use serde_json::json;
    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::infrastructure::messaging::ConnectionStateCell;

    struct Harness {
        events: GameEvents,
        sent: mpsc::UnboundedReceiver<ClientMessage>,
        _disconnect: oneshot::Receiver<()>,
    }

    fn harness() -> Harness {
        let (tx, sent) = mpsc::unbounded_channel();
        let (disconnect_tx, disconnect_rx) = oneshot::channel();
        let state = ConnectionStateCell::new();
        let events = GameEvents::from_parts(
            CommandBus::new(tx),
            ConnectionHandle::new(state.clone(), disconnect_tx),
            state.observer(),
            GameStore::new(),
        );
        Harness {
            events,
            sent,
            _disconnect: disconnect_rx,
        }
    }

    fn wire(message: &ClientMessage) -> (&'static str, serde_json::Value) {
        (message.event_name(), message.payload().expect("payload"))
    }

    #[test]
    fn each_action_emits_one_documented_event() {
        let Harness {
            events, mut sent, ..
        } = harness();

        type Action = Box<dyn Fn(&GameEvents) -> Result<(), CommandError>>;
        let cases: Vec<(Action, &str, serde_json::Value)> = vec![
            (
                Box::new(|e: &GameEvents| e.join(3, "Ada")),
                "join",
                json!({"game_id": 3, "name": "Ada"}),
            ),
            (Box::new(|e: &GameEvents| e.leave(3)), "leave", json!({"game_id": 3})),
            (
                Box::new(|e: &GameEvents| e.join_team(3, Team::Red, true)),
                "switch_team",
                json!({"game_id": 3, "team": "red", "as_spymaster": true}),
            ),
            (
                Box::new(|e: &GameEvents| e.switch_collection(3, "animals")),
                "switch_collection",
                json!({"game_id": 3, "collection": "animals"}),
            ),
            (Box::new(|e: &GameEvents| e.start_game(3)), "start_game", json!({"game_id": 3})),
            (Box::new(|e: &GameEvents| e.reset_game(3)), "reset_game", json!({"game_id": 3})),
            (
                Box::new(|e: &GameEvents| e.give_hint(3, "ocean", 2)),
                "give_hint",
                json!({"game_id": 3, "hint": "ocean", "count": 2}),
            ),
            (
                Box::new(|e: &GameEvents| e.vote(3, 11)),
                "vote",
                json!({"game_id": 3, "card": 11}),
            ),
            (
                Box::new(|e: &GameEvents| e.reveal(3, 11)),
                "reveal_card",
                json!({"game_id": 3, "card": 11}),
            ),
            (
                Box::new(|e: &GameEvents| e.debug_fill(3)),
                "debug_fill_game",
                json!({"game_id": 3}),
            ),
            (Box::new(|e: &GameEvents| e.debug_leave_all()), "debug_leave_all", json!({})),
            (
                Box::new(|e: &GameEvents| e.debug_give_hint(3, "moon", 1)),
                "debug_give_hint",
                json!({"game_id": 3, "hint": "moon", "count": 1}),
            ),
            (
                Box::new(|e: &GameEvents| e.debug_vote(3, 4)),
                "debug_vote",
                json!({"game_id": 3, "card": 4}),
            ),
            (
                Box::new(|e: &GameEvents| e.debug_reveal(3, 4)),
                "debug_reveal_card",
                json!({"game_id": 3, "card": 4}),
            ),
        ];

        for (action, event, payload) in cases {
            action(&events).expect("emit");

            let message = sent.try_recv().expect("one event");
            assert_eq!(wire(&message), (event, payload));
            assert!(sent.try_recv().is_err(), "{event} emitted more than once");
        }
    }

    #[test]
    fn outbound_actions_leave_store_untouched() {
        let Harness {
            events,
            sent: _sent,
            ..
        } = harness();

        events.join(1, "Ada").expect("join");
        events.join_team(1, Team::Blue, false).expect("switch_team");
        events.start_game(1).expect("start");
        events.reveal(1, 0).expect("reveal");

        assert_eq!(events.store().game(), None);
        assert!(!events.store().is_host());
        assert_eq!(events.store().last_chosen_card(), None);
    }

    #[test]
    fn emit_fails_once_bridge_is_gone() {
        let Harness { events, sent, .. } = harness();
        drop(sent);

        assert!(matches!(
            events.vote(1, 2),
            Err(CommandError::ChannelClosed { event: "vote" })
        ));
    }

    #[tokio::test]
    async fn close_signals_disconnect() {
        let Harness {
            events,
            _disconnect: disconnect,
            ..
        } = harness();

        assert_eq!(events.state(), ConnectionState::Disconnected);
        events.close();

        assert!(disconnect.await.is_ok());
    }

    #[tokio::test]
    async fn dev_mode_adds_loggers_ahead_of_store_handler() {
        let store = GameStore::new();
        let (inbound, outbound) = listeners(true, &store).await;
        assert_eq!(inbound.subscriber_count().await, 2);
        assert_eq!(outbound.subscriber_count().await, 1);

        inbound
            .dispatch(ServerMessage::WhoIsHost(HostUpdate { is_host: true }))
            .await;
        assert!(store.is_host());
    }

    #[tokio::test]
    async fn without_dev_mode_only_store_handler_listens() {
        let store = GameStore::new();
        let (inbound, outbound) = listeners(false, &store).await;
        assert_eq!(inbound.subscriber_count().await, 1);
        assert_eq!(outbound.subscriber_count().await, 0);

        inbound
            .dispatch(ServerMessage::WhoIsHost(HostUpdate { is_host: true }))
            .await;
        assert!(store.is_host());
    }
}
