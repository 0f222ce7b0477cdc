//! Codepics Player - headless runner.
//!
//! Opens the route named by `CODEPICS_ROUTE` against the configured server
//! and logs what it sees.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codepics_player::config::load_dotenv_from_repo_root;
use codepics_player::{
    ClientConfig, ConnectionState, GameEvents, GameStore, LobbyService, QueryClient, Route,
    RunnerConfig,
};
use codepics_shared::GameId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codepics_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Codepics Player");

    let config = RunnerConfig::from_env()?;
    tracing::info!(route = %config.route, "Backend at {}", config.client.backend_url);

    let lobby = LobbyService::new(Arc::new(QueryClient::new(&config.client.backend_url)));

    match config.route {
        Route::Home => show_home(&lobby).await,
        Route::Ping => {
            if lobby.server_alive().await {
                tracing::info!("Server is alive");
            } else {
                tracing::warn!("Server did not answer ping");
            }
            Ok(())
        }
        Route::Lobby { id } => play(&config.client, id, &config.player_name).await,
    }
}

async fn show_home(lobby: &LobbyService) -> anyhow::Result<()> {
    let games = lobby.list_games().await?;
    if games.is_empty() {
        tracing::info!("No games yet");
    }
    for game in &games {
        tracing::info!(
            game_id = game.game_id,
            players = game.players,
            joinable = game.is_joinable(),
            "Lobby"
        );
    }

    let collections = lobby.card_collections().await?;
    tracing::info!("Card collections: {}", collections.join(", "));
    Ok(())
}

/// Join `game_id` and log state changes until Ctrl-C.
async fn play(config: &ClientConfig, game_id: GameId, name: &str) -> anyhow::Result<()> {
    let store = GameStore::new();
    let events = GameEvents::connect(config, store.clone()).await?;
    events.join(game_id, name)?;

    let mut game_rx = store.subscribe_game();
    let mut host_rx = store.subscribe_host();
    let mut notice_rx = store.subscribe_notice();
    let mut observer = events.observer();
    observer
        .wait_for(|s| s != ConnectionState::Disconnected)
        .await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Leaving game {}", game_id);
                break;
            }
            changed = game_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(game) = game_rx.borrow_and_update().as_ref() {
                    let phase = game.phase();
                    tracing::info!(
                        game_id = game.id,
                        play_state = %game.play_state,
                        in_lobby = phase.is_lobby(),
                        turn = ?phase.active_team(),
                        hidden_cards = game.hidden_cards(),
                        blue = game.teams.blue.player_count(),
                        red = game.teams.red.player_count(),
                        "Game updated"
                    );
                }
            }
            changed = host_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::info!(is_host = *host_rx.borrow_and_update(), "Host changed");
            }
            changed = notice_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(notice) = notice_rx.borrow_and_update().as_ref() {
                    tracing::warn!(?notice, "Server notice");
                }
            }
            state = observer.wait_for(|s| {
                matches!(s, ConnectionState::Failed | ConnectionState::Disconnected)
            }) => {
                tracing::error!(?state, "Connection ended");
                events.close();
                anyhow::bail!("lost connection to game server");
            }
        }
    }

    if let Err(e) = events.leave(game_id) {
        tracing::warn!("Could not send leave: {}", e);
    }
    events.close();

    // Let the leave reach the server before the runtime shuts down
    let closed = tokio::time::timeout(
        Duration::from_secs(2),
        observer.wait_for(|s| matches!(s, ConnectionState::Disconnected | ConnectionState::Failed)),
    )
    .await;
    if closed.is_err() {
        tracing::warn!("Timed out waiting for the socket to close");
    }
    Ok(())
}
