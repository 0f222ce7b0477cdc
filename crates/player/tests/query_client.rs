//! QueryClient against a stub HTTP server.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use codepics_player::{LobbyService, QueryClient, QueryError, QueryPort};
use codepics_shared::LobbyState;

async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    Url::parse(&format!("http://{addr}/")).expect("url")
}

fn lobby_server() -> Router {
    Router::new()
        .route(
            "/games",
            get(|| async {
                Json(json!({"games": [
                    {"game_id": 1, "players": 2, "state": "waiting"},
                    {"game_id": 4, "players": 8, "state": "playing"}
                ]}))
            }),
        )
        .route(
            "/card_collections",
            get(|| async { Json(json!({"collections": ["space", "animals"]})) }),
        )
        .route(
            "/create_game",
            post(|| async { Json(json!({"game_id": 9})) }),
        )
        .route("/ping", get(|| async { Json("pong!") }))
}

#[tokio::test]
async fn decodes_lobby_endpoints() {
    let base = serve(lobby_server()).await;
    let client = QueryClient::new(&base);

    let games = client.games().await.expect("games");
    assert_eq!(games.games.len(), 2);
    assert_eq!(games.games[0].state, LobbyState::Waiting);
    assert_eq!(games.games[1].players, 8);

    let collections = client.card_collections().await.expect("collections");
    assert_eq!(collections.collections, vec!["space", "animals"]);

    let created: Value = client.create_game().await.expect("create");
    assert_eq!(created, json!({"game_id": 9}));

    assert_eq!(client.ping().await.expect("ping"), "pong!");
    assert_eq!(client.base_url(), &base);
}

#[tokio::test]
async fn lobby_service_over_http() {
    let base = serve(lobby_server()).await;
    let lobby = LobbyService::new(Arc::new(QueryClient::new(&base)));

    let joinable = lobby.joinable_games().await.expect("joinable");
    assert_eq!(joinable.len(), 1);
    assert_eq!(joinable[0].game_id, 1);

    assert_eq!(
        lobby.card_collections().await.expect("collections"),
        vec!["animals", "space"]
    );
    assert!(lobby.server_alive().await);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let router = Router::new().route(
        "/games",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database on fire") }),
    );
    let base = serve(router).await;
    let client = QueryClient::new(&base);

    let err = client.games().await.expect_err("500");
    assert_eq!(
        err,
        QueryError::HttpError {
            status: 500,
            body: "database on fire".into()
        }
    );

    let err = client.card_collections().await.expect_err("404");
    assert!(matches!(err, QueryError::HttpError { status: 404, .. }));
}

#[tokio::test]
async fn unexpected_body_is_a_parse_error() {
    let router = Router::new().route("/games", get(|| async { "not json" }));
    let base = serve(router).await;

    let err = QueryClient::new(&base).games().await.expect_err("bad body");
    assert!(matches!(err, QueryError::ParseError(_)));
}

#[tokio::test]
async fn bare_text_ping_reply_is_not_alive() {
    let router = Router::new().route("/ping", get(|| async { "pong!" }));
    let base = serve(router).await;
    let client = QueryClient::new(&base);

    assert!(matches!(client.ping().await, Err(QueryError::ParseError(_))));
    assert!(!LobbyService::new(Arc::new(client)).server_alive().await);
}

#[tokio::test]
async fn unreachable_server_is_request_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let base = Url::parse(&format!("http://{addr}/")).expect("url");
    let err = QueryClient::new(&base).ping().await.expect_err("refused");
    assert!(matches!(err, QueryError::RequestFailed(_)));
}
