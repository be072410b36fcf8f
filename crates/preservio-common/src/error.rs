//! Error types for Preservio
//!
//! This module defines the common error type used throughout the system.

use thiserror::Error;

/// Common result type for Preservio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Preservio
#[derive(Debug, Error)]
pub enum Error {
    // Ingest conflicts
    #[error("entity already exists: {0}")]
    AlreadyExists(String),

    // Lookup failures
    #[error("not found: {0}")]
    NotFound(String),

    #[error("missing property {predicate} on node {path}")]
    MissingProperty { path: String, predicate: String },

    // Staging and local I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Binary content source
    #[error("content fetch failed for {uri}: {reason}")]
    ContentFetch { uri: String, reason: String },

    // Metadata and entity serialization
    #[error("codec error: {0}")]
    Codec(String),

    // Opaque graph store failures, including conflicting writes
    #[error("graph store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create an already-exists error for an entity id
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists(id.into())
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a content fetch error
    pub fn content_fetch(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContentFetch {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create an opaque store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Check if this is an id collision
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    /// Check if this is a not found error
    ///
    /// A missing expected property on a node assumed well-formed counts
    /// as not-found for callers that only distinguish absence from
    /// conflict.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MissingProperty { .. })
    }

    /// Get the HTTP status code an outer REST layer should map this to
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            Self::NotFound(_) | Self::MissingProperty { .. } => 404,

            // 409 Conflict
            Self::AlreadyExists(_) => 409,

            // 502 Bad Gateway: the ingest source could not be read
            Self::ContentFetch { .. } => 502,

            // 500 Internal Server Error
            Self::Io(_) | Self::Codec(_) | Self::Store(_) | Self::Configuration(_) => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e.to_string())
    }
}
