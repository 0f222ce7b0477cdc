//! Socket event types for client-server communication
//!
//! Every event on the socket is a name plus one JSON payload. `ClientMessage`
//! covers what the player emits, `ServerMessage` what the server pushes.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming an event name is a breaking change
//! - Unknown inbound event names decode to `ServerMessage::Unknown`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CardIndex, CardInfo, GameId, GameState, Team};

// =============================================================================
// Client Messages (Player → Server)
// =============================================================================

/// Events emitted by the player.
///
/// Serializes to the bare payload object; the event name comes from
/// [`ClientMessage::event_name`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClientMessage {
    /// Join (or create) a reserved lobby under a display name
    Join { game_id: GameId, name: String },
    Leave { game_id: GameId },
    /// Move to a team, optionally taking the spymaster seat
    SwitchTeam {
        game_id: GameId,
        team: Team,
        as_spymaster: bool,
    },
    SwitchCollection { game_id: GameId, collection: String },
    StartGame { game_id: GameId },
    ResetGame { game_id: GameId },
    /// Spymaster hint for the active team
    GiveHint {
        game_id: GameId,
        hint: String,
        count: u32,
    },
    Vote { game_id: GameId, card: CardIndex },
    RevealCard { game_id: GameId, card: CardIndex },

    // =========================================================================
    // Server debug helpers (honored only when the server runs in debug mode)
    // =========================================================================
    /// Fill the lobby with scripted bot players
    DebugFillGame { game_id: GameId },
    DebugLeaveAll {},
    DebugGiveHint {
        game_id: GameId,
        hint: String,
        count: u32,
    },
    DebugVote { game_id: GameId, card: CardIndex },
    DebugRevealCard { game_id: GameId, card: CardIndex },
}

impl ClientMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::Join { .. } => "join",
            ClientMessage::Leave { .. } => "leave",
            ClientMessage::SwitchTeam { .. } => "switch_team",
            ClientMessage::SwitchCollection { .. } => "switch_collection",
            ClientMessage::StartGame { .. } => "start_game",
            ClientMessage::ResetGame { .. } => "reset_game",
            ClientMessage::GiveHint { .. } => "give_hint",
            ClientMessage::Vote { .. } => "vote",
            ClientMessage::RevealCard { .. } => "reveal_card",
            ClientMessage::DebugFillGame { .. } => "debug_fill_game",
            ClientMessage::DebugLeaveAll {} => "debug_leave_all",
            ClientMessage::DebugGiveHint { .. } => "debug_give_hint",
            ClientMessage::DebugVote { .. } => "debug_vote",
            ClientMessage::DebugRevealCard { .. } => "debug_reveal_card",
        }
    }

    /// The payload object sent alongside the event name.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// =============================================================================
// Server Messages (Server → Player)
// =============================================================================

/// Card list with every team revealed, sent only to spymasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpymasterVision {
    pub cards: Vec<CardInfo>,
}

/// Payload shared by every game-carrying event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameUpdate {
    pub game: GameState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spymaster_vision: Option<SpymasterVision>,
    /// Card just revealed (`update_card` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_card: Option<CardIndex>,
}

impl GameUpdate {
    pub fn new(game: GameState) -> Self {
        Self {
            game,
            spymaster_vision: None,
            chosen_card: None,
        }
    }

    pub fn with_spymaster_vision(mut self, cards: Vec<CardInfo>) -> Self {
        self.spymaster_vision = Some(SpymasterVision { cards });
        self
    }

    /// The game as this client should see it: spymaster cards win over the
    /// public card list when present.
    pub fn into_visible_game(self) -> GameState {
        let mut game = self.game;
        if let Some(vision) = self.spymaster_vision {
            game.cards = vision.cards;
        }
        game
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUpdate {
    pub is_host: bool,
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    UpdateGame(GameUpdate),
    UpdateTeams(GameUpdate),
    WhoIsHost(HostUpdate),
    NewTurn(GameUpdate),
    UpdateVote(GameUpdate),
    UpdateCard(GameUpdate),
    /// Rejected action, human readable
    Error(String),
    /// Payload failed the server's schema check: field name to problem
    SchemaError(BTreeMap<String, String>),
    /// Event name this client does not handle
    Unknown {
        event: String,
        payload: serde_json::Value,
    },
}

impl ServerMessage {
    /// Decode a named socket event.
    ///
    /// Unknown names never fail; a known name with a payload of the wrong shape does.
    pub fn from_event(event: &str, payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match event {
            "update_game" => ServerMessage::UpdateGame(serde_json::from_value(payload)?),
            "update_teams" => ServerMessage::UpdateTeams(serde_json::from_value(payload)?),
            "who_is_host" => ServerMessage::WhoIsHost(serde_json::from_value(payload)?),
            "new_turn" => ServerMessage::NewTurn(serde_json::from_value(payload)?),
            "update_vote" => ServerMessage::UpdateVote(serde_json::from_value(payload)?),
            "update_card" => ServerMessage::UpdateCard(serde_json::from_value(payload)?),
            "error" => ServerMessage::Error(serde_json::from_value(payload)?),
            "schema_error" => ServerMessage::SchemaError(serde_json::from_value(payload)?),
            other => ServerMessage::Unknown {
                event: other.to_string(),
                payload,
            },
        })
    }

    pub fn event_name(&self) -> &str {
        match self {
            ServerMessage::UpdateGame(_) => "update_game",
            ServerMessage::UpdateTeams(_) => "update_teams",
            ServerMessage::WhoIsHost(_) => "who_is_host",
            ServerMessage::NewTurn(_) => "new_turn",
            ServerMessage::UpdateVote(_) => "update_vote",
            ServerMessage::UpdateCard(_) => "update_card",
            ServerMessage::Error(_) => "error",
            ServerMessage::SchemaError(_) => "schema_error",
            ServerMessage::Unknown { event, .. } => event,
        }
    }

    /// Encode back into the payload the server would have sent.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ServerMessage::UpdateGame(update)
            | ServerMessage::UpdateTeams(update)
            | ServerMessage::NewTurn(update)
            | ServerMessage::UpdateVote(update)
            | ServerMessage::UpdateCard(update) => serde_json::to_value(update),
            ServerMessage::WhoIsHost(host) => serde_json::to_value(host),
            ServerMessage::Error(message) => serde_json::to_value(message),
            ServerMessage::SchemaError(errors) => serde_json::to_value(errors),
            ServerMessage::Unknown { payload, .. } => Ok(payload.clone()),
        }
    }

    /// The game update carried by this event, if any.
    pub fn game_update(&self) -> Option<&GameUpdate> {
        match self {
            ServerMessage::UpdateGame(update)
            | ServerMessage::UpdateTeams(update)
            | ServerMessage::NewTurn(update)
            | ServerMessage::UpdateVote(update)
            | ServerMessage::UpdateCard(update) => Some(update),
            _ => None,
        }
    }
}
