//! Error types shared by the service client, dictionary loader and config.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed trie snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid service URL: {0}")]
    Url(String),
}

pub type Result<T> = std::result::Result<T, AssistError>;
