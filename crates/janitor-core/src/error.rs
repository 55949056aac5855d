//! Error types for the janitor plugins
//!
//! Builders never retry. Every error returned from a builder has already been
//! logged once at error level by the code that raised it.

use thiserror::Error;

/// Result type alias for janitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for plugin construction
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration key is missing or a value is unusable
    #[error("{0}")]
    Config(String),

    /// A one-time remote setup step failed
    #[error("{0}")]
    Janitor(String),

    /// Credentials could not be loaded or exchanged
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An API client could not be built or used
    #[error("Client error: {0}")]
    Client(String),

    /// Transport-level failure talking to a remote API
    #[error("HTTP error: {0}")]
    Http(String),

    /// Local I/O errors (e.g. reading a keyfile)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a remote-bootstrap error
    pub fn janitor(msg: impl Into<String>) -> Self {
        Self::Janitor(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a client error
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this is a remote-bootstrap error
    pub fn is_janitor(&self) -> bool {
        matches!(self, Self::Janitor(_))
    }
}
