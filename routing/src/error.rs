//! Error types for routing and orchestration

use bus_core::Direction;
use thiserror::Error;
use uuid::Uuid;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Routing errors
///
/// The router downgrades route-scoped errors to recorded outcomes; only
/// resolution of the thread itself (or an empty route set) is fatal to a
/// call. The orchestrator treats every step error as flow-fatal.
#[derive(Error, Debug)]
pub enum Error {
    /// Thread / route / system / connection lookup failure
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No thread routes for the requested direction
    #[error("no routes found for thread {thread_id} with direction {direction}")]
    NoRoute {
        /// Thread that was resolved
        thread_id: Uuid,
        /// Requested direction
        direction: Direction,
    },

    /// Payload format conversion failure
    #[error("conversion error: {0}")]
    Conversion(#[from] formats::Error),

    /// Adapter-level send failure (includes unsupported protocols)
    #[error("protocol error: {0}")]
    Protocol(#[from] adapters::Error),

    /// Process name outside the registered set
    #[error("unknown process: {0}")]
    UnknownProcess(String),

    /// Dispatch or step exceeded its timeout
    #[error("timeout after {seconds}s: {operation}")]
    Timeout {
        /// Budget that elapsed
        seconds: u64,
        /// What was in flight
        operation: String,
    },

    /// Payload is not parseable as a structured value
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

impl From<bus_core::Error> for Error {
    fn from(e: bus_core::Error) -> Self {
        Error::Configuration(e.to_string())
    }
}
