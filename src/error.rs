use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = CardError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CardError {
    /// The decklist did not contain a player name and a deck archetype.
    #[error("malformed decklist: expected at least 2 non-empty lines (player name, deck archetype), found {found}")]
    MalformedDecklist { found: usize },

    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("load image {path}: {source}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("write card {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
