//! HTTP client for the game server's lobby endpoints
//!
//! Implements the QueryPort trait with reqwest. No retries and no response
//! shaping beyond JSON decoding; non-success statuses are errors.

use async_trait::async_trait;
use codepics_shared::{CardCollections, GameList};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::ports::outbound::{QueryError, QueryPort};

/// Client for the lobby endpoints
#[derive(Clone)]
pub struct QueryClient {
    client: Client,
    base_url: Url,
}

impl QueryClient {
    pub fn new(base_url: &Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &Url) -> Self {
        let mut base_url = base_url.clone();
        // Joined paths must land under the base, not replace its last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, QueryError> {
        self.base_url
            .join(path)
            .map_err(|e| QueryError::InvalidUrl(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Response, QueryError> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| QueryError::RequestFailed(e.to_string()))?;
        check_status(response).await
    }

    async fn post(&self, path: &str) -> Result<Response, QueryError> {
        let url = self.url(path)?;
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| QueryError::RequestFailed(e.to_string()))?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, QueryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(QueryError::HttpError {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, QueryError> {
    response
        .json()
        .await
        .map_err(|e| QueryError::ParseError(e.to_string()))
}

#[async_trait]
impl QueryPort for QueryClient {
    async fn games(&self) -> Result<GameList, QueryError> {
        decode(self.get("games").await?).await
    }

    async fn card_collections(&self) -> Result<CardCollections, QueryError> {
        decode(self.get("card_collections").await?).await
    }

    async fn create_game(&self) -> Result<Value, QueryError> {
        decode(self.post("create_game").await?).await
    }

    /// The server answers with a JSON string.
    async fn ping(&self) -> Result<String, QueryError> {
        decode(self.get("ping").await?).await
    }
}
