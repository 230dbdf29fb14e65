//! Error types for adapters

use bus_core::Protocol;
use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// HTTP response with an error status
    #[error("HTTP error {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Action token is not a valid HTTP method
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// SOAP envelope construction failure
    #[error("SOAP envelope error: {0}")]
    Envelope(String),

    /// Queue declare/publish failure
    #[error("queue error: {0}")]
    Queue(String),

    /// Protocol with no registered adapter
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(Protocol),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
