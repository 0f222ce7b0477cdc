//! Lobby service - the data the home view needs from the HTTP endpoints.

use std::sync::Arc;

use codepics_shared::LobbyInfo;
use serde_json::Value;

use crate::ports::outbound::{QueryError, QueryPort};

/// Reply the server sends on `/ping`.
pub const PING_REPLY: &str = "pong!";

#[derive(Clone)]
pub struct LobbyService {
    query: Arc<dyn QueryPort>,
}

impl LobbyService {
    pub fn new(query: Arc<dyn QueryPort>) -> Self {
        Self { query }
    }

    pub async fn list_games(&self) -> Result<Vec<LobbyInfo>, QueryError> {
        Ok(self.query.games().await?.games)
    }

    /// Games still waiting for players.
    pub async fn joinable_games(&self) -> Result<Vec<LobbyInfo>, QueryError> {
        let games = self.list_games().await?;
        Ok(games.into_iter().filter(LobbyInfo::is_joinable).collect())
    }

    /// Collection names, sorted for display.
    pub async fn card_collections(&self) -> Result<Vec<String>, QueryError> {
        let mut collections = self.query.card_collections().await?.collections;
        collections.sort();
        Ok(collections)
    }

    pub async fn create_game(&self) -> Result<Value, QueryError> {
        let created = self.query.create_game().await?;
        tracing::info!(response = %created, "Created game");
        Ok(created)
    }

    /// Whether the server answers `/ping` with the expected reply.
    ///
    /// A failed request counts as not alive, it is not an error.
    pub async fn server_alive(&self) -> bool {
        match self.query.ping().await {
            Ok(reply) => reply.trim() == PING_REPLY,
            Err(e) => {
                tracing::debug!("Ping failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use codepics_shared::{CardCollections, GameList, LobbyState};

    use super::*;
    use crate::ports::outbound::MockQueryPort;

    fn lobby(game_id: u64, players: u32, state: LobbyState) -> LobbyInfo {
        LobbyInfo {
            game_id,
            players,
            state,
        }
    }

    #[tokio::test]
    async fn joinable_games_keeps_waiting_lobbies() {
        let mut query = MockQueryPort::new();
        query.expect_games().times(1).returning(|| {
            Ok(GameList {
                games: vec![
                    lobby(1, 3, LobbyState::Waiting),
                    lobby(2, 8, LobbyState::Playing),
                    lobby(3, 0, LobbyState::Waiting),
                ],
            })
        });

        let service = LobbyService::new(Arc::new(query));
        let games = service.joinable_games().await.expect("games");

        let ids: Vec<u64> = games.iter().map(|g| g.game_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn card_collections_are_sorted() {
        let mut query = MockQueryPort::new();
        query.expect_card_collections().returning(|| {
            Ok(CardCollections {
                collections: vec!["space".into(), "animals".into(), "mythology".into()],
            })
        });

        let service = LobbyService::new(Arc::new(query));

        assert_eq!(
            service.card_collections().await.expect("collections"),
            vec!["animals", "mythology", "space"]
        );
    }

    #[tokio::test]
    async fn create_game_passes_body_through() {
        let mut query = MockQueryPort::new();
        query
            .expect_create_game()
            .returning(|| Ok(serde_json::json!({"game_id": 5})));

        let service = LobbyService::new(Arc::new(query));

        assert_eq!(
            service.create_game().await.expect("create"),
            serde_json::json!({"game_id": 5})
        );
    }

    #[tokio::test]
    async fn query_errors_propagate() {
        let mut query = MockQueryPort::new();
        query.expect_games().returning(|| {
            Err(QueryError::HttpError {
                status: 500,
                body: "boom".into(),
            })
        });

        let service = LobbyService::new(Arc::new(query));
        let err = service.list_games().await.expect_err("server error");

        assert_eq!(
            err,
            QueryError::HttpError {
                status: 500,
                body: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn server_alive_checks_reply() {
        let mut alive = MockQueryPort::new();
        alive.expect_ping().returning(|| Ok(PING_REPLY.to_string()));
        assert!(LobbyService::new(Arc::new(alive)).server_alive().await);

        let mut wrong = MockQueryPort::new();
        wrong.expect_ping().returning(|| Ok("hello".to_string()));
        assert!(!LobbyService::new(Arc::new(wrong)).server_alive().await);

        let mut down = MockQueryPort::new();
        down.expect_ping()
            .returning(|| Err(QueryError::RequestFailed("connection refused".into())));
        assert!(!LobbyService::new(Arc::new(down)).server_alive().await);
    }
}
