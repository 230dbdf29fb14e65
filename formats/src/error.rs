//! Error types for format conversion

use bus_core::FileFormat;
use thiserror::Error;

/// Result type for conversions
pub type Result<T> = std::result::Result<T, Error>;

/// Conversion errors
#[derive(Error, Debug)]
pub enum Error {
    /// Format pair outside the supported set
    #[error("unsupported conversion: {from} -> {to}")]
    UnsupportedConversion {
        /// Source format
        from: FileFormat,
        /// Target format
        to: FileFormat,
    },

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML input or XML write failure
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed CSV input or CSV write failure
    #[error("CSV error: {0}")]
    Csv(String),
}
