//! Client-side state containers

mod game_store;

pub use game_store::{GameStore, ServerNotice};
