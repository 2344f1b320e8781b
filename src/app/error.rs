use thiserror::Error;

use crate::client::NewsApiError;
use crate::domain::FailureKind;
use crate::session::AuthError;

#[derive(Error, Debug)]
pub enum NewsreelError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News API error: {0}")]
    Api(#[from] NewsApiError),

    #[error("Failed to load feed: {0}")]
    Feed(FailureKind),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NewsreelError>;
