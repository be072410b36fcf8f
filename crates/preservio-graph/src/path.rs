//! Hierarchical node paths
//!
//! Stored nodes are addressed by `/`-separated paths
//! (entity / representation / file / bitstream / metadata slot).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized path of a node in the graph store
///
/// Always carries a leading `/` and no trailing one, regardless of the
/// form it was constructed from.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(String);

impl NodePath {
    /// Create a path, normalizing separators
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut normalized = String::new();
        for segment in path.as_ref().split('/').filter(|s| !s.is_empty()) {
            normalized.push('/');
            normalized.push_str(segment);
        }
        Self(normalized)
    }

    /// Append a child segment
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.0, segment))
    }

    /// The last path segment, e.g. the identifier of the addressed node
    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Get the path as a string slice (leading `/` included)
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({:?})", self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known child segments of stored nodes
pub mod slot {
    /// Descriptive metadata of an entity
    pub const DESCRIPTIVE: &str = "DESCRIPTIVE";
    /// Technical metadata of a representation, file or bitstream
    pub const TECHNICAL: &str = "TECHNICAL";
    /// Source metadata of a representation
    pub const SOURCE: &str = "SOURCE";
    /// Rights metadata of a representation
    pub const RIGHTS: &str = "RIGHTS";
    /// Provenance metadata of a representation
    pub const PROVENANCE: &str = "PROVENANCE";
    /// Binary content of a file
    pub const DATA: &str = "DATA";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(NodePath::new("objects/scape/entities").as_str(), "/objects/scape/entities");
        assert_eq!(NodePath::new("/objects/scape/queue").as_str(), "/objects/scape/queue");
        assert_eq!(NodePath::new("//a///b/").as_str(), "/a/b");
    }

    #[test]
    fn test_child_and_last_segment() {
        let path = NodePath::new("objects/scape/entities").child("entity-1");
        assert_eq!(path.as_str(), "/objects/scape/entities/entity-1");
        assert_eq!(path.last_segment(), "entity-1");
        assert_eq!(path.child(slot::DESCRIPTIVE).last_segment(), "DESCRIPTIVE");
    }
}
