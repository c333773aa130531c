//! Error types for the records crate.

use thiserror::Error;

/// Errors that can occur while turning fetched rows into a loaded snapshot.
///
/// Any of these aborts the whole load; the store keeps whatever snapshot it
/// held before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Two records in the same load share an identity key
    #[error("Duplicate record key: {key}")]
    DuplicateKey { key: String },

    /// A record arrived with a blank identity key
    #[error("Record at position {index} has an empty key")]
    EmptyKey { index: usize },

    /// A raw row could not be mapped onto the record shape
    ///
    /// This variant stores context about where the error occurred
    #[error("Malformed {collection} row at position {index}: {reason}")]
    MalformedRow {
        collection: String,
        index: usize,
        reason: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LoadError>;
