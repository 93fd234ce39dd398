//! Error types for the statblock importer.
//!
//! The parse engine never fails on malformed content; these errors only come
//! from the edges (configuration, file I/O, hint parsing, and the record store
//! used while materializing a parsed record).

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur around a parse invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed as TOML.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A hint or CLI argument named a block that does not exist.
    #[error("Unknown block id: {0}")]
    UnknownBlock(String),

    /// The record store rejected a materialized record.
    #[error("Storage error: {0}")]
    Store(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a storage error.
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }
}
