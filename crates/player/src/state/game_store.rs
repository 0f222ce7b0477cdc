//! Reactive mirror of the server's game state.
//!
//! Every field lives in its own `watch` channel so callers can either read the
//! latest value or await changes. Only the inbound event handler writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use codepics_shared::{CardIndex, GameState};
use tokio::sync::watch;

/// Last complaint the server sent about one of our emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerNotice {
    /// `error` event, e.g. "Game 3 does not exist"
    Error(String),
    /// `schema_error` event: field name to validation message
    SchemaError(BTreeMap<String, String>),
}

/// Shared store for the mirrored game. Clones share the same channels.
#[derive(Clone)]
pub struct GameStore {
    game: Arc<watch::Sender<Option<GameState>>>,
    is_host: Arc<watch::Sender<bool>>,
    notice: Arc<watch::Sender<Option<ServerNotice>>>,
    chosen_card: Arc<watch::Sender<Option<CardIndex>>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            game: Arc::new(watch::Sender::new(None)),
            is_host: Arc::new(watch::Sender::new(false)),
            notice: Arc::new(watch::Sender::new(None)),
            chosen_card: Arc::new(watch::Sender::new(None)),
        }
    }

    /// Latest game, `None` until the first game-carrying event.
    pub fn game(&self) -> Option<GameState> {
        self.game.borrow().clone()
    }

    pub fn subscribe_game(&self) -> watch::Receiver<Option<GameState>> {
        self.game.subscribe()
    }

    pub fn is_host(&self) -> bool {
        *self.is_host.borrow()
    }

    pub fn subscribe_host(&self) -> watch::Receiver<bool> {
        self.is_host.subscribe()
    }

    pub fn last_notice(&self) -> Option<ServerNotice> {
        self.notice.borrow().clone()
    }

    pub fn subscribe_notice(&self) -> watch::Receiver<Option<ServerNotice>> {
        self.notice.subscribe()
    }

    /// Index of the card most recently revealed.
    pub fn last_chosen_card(&self) -> Option<CardIndex> {
        *self.chosen_card.borrow()
    }

    pub(crate) fn replace_game(&self, game: GameState) {
        self.game.send_replace(Some(game));
    }

    pub(crate) fn set_host(&self, is_host: bool) {
        self.is_host.send_replace(is_host);
    }

    pub(crate) fn set_notice(&self, notice: ServerNotice) {
        self.notice.send_replace(Some(notice));
    }

    pub(crate) fn set_chosen_card(&self, card: CardIndex) {
        self.chosen_card.send_replace(Some(card));
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}
