//! HTTP response bodies for the lobby endpoints.

use serde::{Deserialize, Serialize};

use crate::types::GameId;

/// Whether a lobby still accepts players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyState {
    Waiting,
    Playing,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

/// One row of `GET /games`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyInfo {
    pub game_id: GameId,
    pub players: u32,
    pub state: LobbyState,
}

impl LobbyInfo {
    pub fn is_joinable(&self) -> bool {
        self.state == LobbyState::Waiting
    }
}

/// `GET /games`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameList {
    #[serde(default)]
    pub games: Vec<LobbyInfo>,
}

/// `GET /card_collections`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCollections {
    #[serde(default)]
    pub collections: Vec<String>,
}
