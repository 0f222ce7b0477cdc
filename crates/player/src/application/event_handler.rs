//! Applies inbound server events to the [`GameStore`].
//!
//! Every game-carrying event replaces the whole mirrored game; there is no
//! merging and no local validation. The last event for a name wins.

use codepics_shared::ServerMessage;

use crate::state::{GameStore, ServerNotice};

/// Apply one server event to the store.
pub fn handle_server_message(store: &GameStore, message: ServerMessage) {
    match message {
        ServerMessage::UpdateGame(update)
        | ServerMessage::UpdateTeams(update)
        | ServerMessage::NewTurn(update)
        | ServerMessage::UpdateVote(update) => {
            store.replace_game(update.into_visible_game());
        }
        ServerMessage::UpdateCard(update) => {
            if let Some(card) = update.chosen_card {
                tracing::debug!(card, "Card revealed");
                store.set_chosen_card(card);
            }
            store.replace_game(update.into_visible_game());
        }
        ServerMessage::WhoIsHost(host) => {
            store.set_host(host.is_host);
        }
        ServerMessage::Error(message) => {
            tracing::warn!("Server error: {}", message);
            store.set_notice(ServerNotice::Error(message));
        }
        ServerMessage::SchemaError(fields) => {
            tracing::warn!(?fields, "Server rejected an emit");
            store.set_notice(ServerNotice::SchemaError(fields));
        }
        ServerMessage::Unknown { event, .. } => {
            tracing::debug!(event = %event, "Ignoring unhandled server event");
        }
    }
}
