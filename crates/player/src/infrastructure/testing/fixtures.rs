//! Simple test fixtures used across unit and integration tests.

use codepics_shared::{
    CardInfo, CardTeam, GameId, GameState, PlayerInfo, ProtocolError, ServerMessage,
    SocketPacket, Teams,
};

/// A public card, team unknown to the receiver.
pub fn hidden_card(asset: &str) -> CardInfo {
    CardInfo {
        team: None,
        asset: asset.to_string(),
        hidden: true,
    }
}

/// A card as a spymaster sees it.
pub fn spymaster_card(asset: &str, team: CardTeam) -> CardInfo {
    CardInfo {
        team: Some(team),
        ..hidden_card(asset)
    }
}

pub fn player(name: &str, is_self: bool) -> PlayerInfo {
    PlayerInfo {
        name: name.to_string(),
        is_self,
    }
}

/// A game in prep with four hidden cards and nobody seated.
pub fn sample_game(id: GameId) -> GameState {
    GameState {
        id,
        play_state: "prep".to_string(),
        teams: Teams::default(),
        cards: ["cat", "ship", "moon", "tree"]
            .iter()
            .map(|name| hidden_card(&format!("{name}.png")))
            .collect(),
        collection: Some("classic".to_string()),
        votes: Default::default(),
    }
}

/// The `42[...]` frame a server would send for `message`.
pub fn event_frame(message: &ServerMessage) -> Result<String, ProtocolError> {
    let payload = message.payload()?;
    SocketPacket::event(message.event_name(), payload).to_frame()
}
