/// Error type shared by the catalog, API and storage layers
///
/// The carousel engine has no failure paths; everything here comes from the
/// world outside it (network, SQLite, files, image payloads).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status, with the server's message when it sent one
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid data URI: {0}")]
    DataUri(String),

    #[error("could not determine the user data directory")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, FolioError>;
