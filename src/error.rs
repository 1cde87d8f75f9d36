use thiserror::Error;
use crate::store::ResourceKind;

#[derive(Error, Debug)]
pub enum Error {
    // Provider Errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request to {url} failed with status {status}")]
    HttpStatus {
        status: u16,
        url: String,
    },

    #[error("Unexpected payload shape: {0}")]
    Payload(String),

    #[error("No {kind} record found for {id}")]
    RecordNotFound {
        kind: ResourceKind,
        id: String,
    },

    // Price Stream Errors
    #[error("Frame deserialization failed: {0}")]
    DeserializationError(String),

    #[error("Invalid price for {asset}: {raw}")]
    InvalidPrice {
        asset: String,
        raw: String,
    },

    #[error("Price feed not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Max reconnect attempts exceeded: {0}")]
    MaxReconnectAttemptsExceeded(u32),

    // Local Storage Errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Background task failure: {0}")]
    TaskFailed(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Transport-level failures, as opposed to a provider answering with
    /// something we could not use.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::HttpStatus { .. } | Error::ConnectionFailed(_)
        )
    }
}
