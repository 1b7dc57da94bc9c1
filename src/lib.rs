pub mod assets;
pub mod compose;
pub mod config;
pub mod decklist;
pub mod error;
pub mod font;
pub mod portrait;
pub mod text;

// Curated re-exports
pub use compose::{create_player_card, render_card, write_card};
pub use config::CardConfig;
pub use decklist::DecklistRecord;
pub use error::CardError;
