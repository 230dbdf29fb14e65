//! Error types for configuration access

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration store errors
#[derive(Error, Debug)]
pub enum Error {
    /// Entity not found
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Lookup key
        key: String,
    },

    /// Referenced entity missing (foreign-key violation)
    #[error("{entity} references missing {referenced}: {key}")]
    BrokenReference {
        /// Entity kind being created
        entity: &'static str,
        /// Referenced entity kind
        referenced: &'static str,
        /// Reference key
        key: String,
    },

    /// Invalid field value
    #[error("invalid {what}: {value}")]
    InvalidValue {
        /// Field description
        what: &'static str,
        /// Offending value
        value: String,
    },

    /// Storage backend error
    #[error("store backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Shorthand for a not-found error
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
