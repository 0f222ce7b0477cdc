//! Client routes

use std::fmt;

use codepics_shared::GameId;

/// Views the client can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// `/` - lobby list and game creation
    #[default]
    Home,
    /// `/lobby/:id` - a single game, pre-game and in play
    Lobby { id: GameId },
    /// `/ping` - server liveness check
    Ping,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Lobby { id } => write!(f, "/lobby/{id}"),
            Route::Ping => write!(f, "/ping"),
        }
    }
}

impl std::str::FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|seg| !seg.is_empty()).collect();

        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["ping"] => Ok(Route::Ping),
            ["lobby", id] => id
                .parse()
                .map(|id| Route::Lobby { id })
                .map_err(|_| format!("Invalid lobby id: {}", id)),
            _ => Err(format!("Unknown route: {}", s)),
        }
    }
}
