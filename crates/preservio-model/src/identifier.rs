//! Entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of an entity, representation, file or bitstream
///
/// Identifiers become path segments in the graph store, so they must be
/// non-empty and must not contain `/`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier, validating it is usable as a path segment
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if value.contains('/') {
            return Err(IdentifierError::ContainsSlash(value));
        }
        Ok(Self(value))
    }

    /// Create without validation (internal use only)
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to the owned string value
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:?})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when creating an identifier
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentifierError {
    #[error("identifier cannot be empty")]
    Empty,
    #[error("identifier cannot contain '/': {0}")]
    ContainsSlash(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(Identifier::new("entity-1").is_ok());
        assert!(matches!(Identifier::new(""), Err(IdentifierError::Empty)));
        assert!(matches!(
            Identifier::new("a/b"),
            Err(IdentifierError::ContainsSlash(_))
        ));
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(Identifier::generate(), Identifier::generate());
    }
}
