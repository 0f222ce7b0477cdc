//! Game state mirror types.
//!
//! These mirror the JSON the server emits for a game. The client never derives
//! them on its own; every field is taken verbatim from the latest inbound event.
//! Fields that older server revisions omit decode to their defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric game (lobby) identifier assigned by the server.
pub type GameId = u64;

/// Position of a card on the board.
pub type CardIndex = usize;

// =============================================================================
// Teams
// =============================================================================

/// A team players can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Red => "red",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(Team::Blue),
            "red" => Ok(Team::Red),
            other => Err(format!("unknown team: {other}")),
        }
    }
}

/// Affiliation printed on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardTeam {
    Blue,
    Red,
    /// Innocent bystander
    Innocent,
    Assassin,
    /// Unknown variant for forward compatibility
    #[serde(other)]
    Unknown,
}

impl From<Team> for CardTeam {
    fn from(team: Team) -> Self {
        match team {
            Team::Blue => CardTeam::Blue,
            Team::Red => CardTeam::Red,
        }
    }
}

// =============================================================================
// Players and rosters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    /// True on exactly the entry that describes the receiving client
    #[serde(default)]
    pub is_self: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    #[serde(default)]
    pub agents: Vec<PlayerInfo>,
    #[serde(default)]
    pub spymaster: Option<PlayerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards_left: Option<u32>,
}

impl TeamInfo {
    /// Whether the receiving client is on this team, either role.
    pub fn has_self(&self) -> bool {
        self.spymaster.as_ref().is_some_and(|p| p.is_self) || self.agents.iter().any(|p| p.is_self)
    }

    pub fn player_count(&self) -> usize {
        self.agents.len() + usize::from(self.spymaster.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    #[serde(default)]
    pub blue: TeamInfo,
    #[serde(default)]
    pub red: TeamInfo,
}

impl Teams {
    pub fn get(&self, team: Team) -> &TeamInfo {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }

    /// The team the receiving client sits on, if any.
    pub fn self_team(&self) -> Option<Team> {
        [Team::Blue, Team::Red]
            .into_iter()
            .find(|team| self.get(*team).has_self())
    }
}

// =============================================================================
// Cards
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    /// `None` while the card is hidden from a non-spymaster
    #[serde(default)]
    pub team: Option<CardTeam>,
    pub asset: String,
    #[serde(default = "default_hidden")]
    pub hidden: bool,
}

fn default_hidden() -> bool {
    true
}

// =============================================================================
// Play state
// =============================================================================

/// Parsed view of the server's `play_state` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayState {
    /// Lobby: players are picking teams
    Prep,
    SpymasterTurn(Team),
    AgentTurn(Team),
    Win(Team),
    /// Label this client does not understand, kept verbatim
    Unknown(String),
}

impl PlayState {
    pub fn parse(label: &str) -> Self {
        if label == "prep" {
            return PlayState::Prep;
        }

        let Some((team, phase)) = label.split_once('_') else {
            return PlayState::Unknown(label.to_string());
        };
        let Ok(team) = team.parse::<Team>() else {
            return PlayState::Unknown(label.to_string());
        };

        match phase {
            "spymaster" => PlayState::SpymasterTurn(team),
            "agents" => PlayState::AgentTurn(team),
            "win" => PlayState::Win(team),
            _ => PlayState::Unknown(label.to_string()),
        }
    }

    /// Team whose turn it is, if a turn is in progress.
    pub fn active_team(&self) -> Option<Team> {
        match self {
            PlayState::SpymasterTurn(team) | PlayState::AgentTurn(team) => Some(*team),
            _ => None,
        }
    }

    pub fn is_lobby(&self) -> bool {
        matches!(self, PlayState::Prep)
    }
}

// =============================================================================
// Game state
// =============================================================================

/// Server-authoritative game state, as seen by one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub play_state: String,
    #[serde(default)]
    pub teams: Teams,
    #[serde(default)]
    pub cards: Vec<CardInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub votes: serde_json::Map<String, serde_json::Value>,
}

impl GameState {
    pub fn phase(&self) -> PlayState {
        PlayState::parse(&self.play_state)
    }

    pub fn hidden_cards(&self) -> usize {
        self.cards.iter().filter(|c| c.hidden).count()
    }
}
