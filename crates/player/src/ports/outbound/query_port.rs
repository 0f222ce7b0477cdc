//! Query Port - HTTP lobby endpoints of the game server
//!
//! Object-safe so services can hold it as `Arc<dyn QueryPort>` and tests can
//! swap in `MockQueryPort`.

use async_trait::async_trait;
use codepics_shared::{CardCollections, GameList};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("server returned {status}: {body}")]
    HttpError { status: u16, body: String },
    #[error("could not decode response: {0}")]
    ParseError(String),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait QueryPort: Send + Sync {
    /// `GET /games`
    async fn games(&self) -> Result<GameList, QueryError>;

    /// `GET /card_collections`
    async fn card_collections(&self) -> Result<CardCollections, QueryError>;

    /// `POST /create_game`, body returned as-is
    async fn create_game(&self) -> Result<Value, QueryError>;

    /// `GET /ping`, decoded from its JSON string body
    async fn ping(&self) -> Result<String, QueryError>;
}
