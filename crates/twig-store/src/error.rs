//! Error types for twig-store.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during object store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No object matches the given id or prefix.
    #[error("object not found: {0}")]
    NotFound(String),

    /// More than one object matches an abbreviated id.
    #[error("ambiguous object id prefix '{prefix}' matches {matches} objects")]
    Ambiguous {
        /// The prefix that was looked up.
        prefix: String,
        /// How many stored ids share the prefix.
        matches: usize,
    },

    /// The id is not a valid lowercase hex identifier.
    #[error("invalid object id: {0}")]
    InvalidId(String),

    /// The prefix is longer than a full identifier.
    #[error("object id prefix too long: {0}")]
    PrefixTooLong(String),

    /// The object exists but is of a different kind than requested.
    #[error("object {id} is a {found}, expected a {expected}")]
    UnexpectedKind {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Stored bytes do not match their id or cannot be decoded.
    #[error("corrupt object at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error means the object does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
