//! Graph store collaborator boundary
//!
//! The store holds addressable nodes carrying relation/property
//! statements and raw content. All mutations happen inside a session:
//! staged invisibly, applied as a whole on commit, discarded on
//! rollback. Statement order is part of the contract: `statements`
//! returns a node's triples in committed insertion order, which is what
//! lets child lists reconstruct in creation order on fetch.

use crate::path::NodePath;
use crate::statement::{ObjectValue, UpdateBatch};
use async_trait::async_trait;
use bytes::Bytes;
use preservio_common::{Error, Result};

/// Handle to a graph store able to open transactional sessions
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a session representing one logical unit of work
    async fn session(&self) -> Result<Box<dyn GraphSession>>;
}

/// One transactional unit of work against the store
///
/// A session must be explicitly closed on every exit path: `commit` to
/// publish staged mutations atomically, `rollback` to discard them.
/// Reads observe the session's own staged state layered over the
/// committed state.
#[async_trait]
pub trait GraphSession: Send {
    /// Whether a node exists at the path
    async fn exists(&self, path: &NodePath) -> Result<bool>;

    /// Stage creation of a node; fails with `AlreadyExists` on collision
    async fn create_node(&mut self, path: &NodePath) -> Result<()>;

    /// Stage raw content at a path, creating the node if needed
    async fn put_content(
        &mut self,
        path: &NodePath,
        content_type: &str,
        content: Bytes,
    ) -> Result<()>;

    /// Read the raw content stored at a path; `NotFound` if absent
    async fn get_content(&self, path: &NodePath) -> Result<Bytes>;

    /// All relation/property statements of a node, in committed
    /// insertion order; `NotFound` if the node is absent
    async fn statements(&self, path: &NodePath) -> Result<Vec<(String, ObjectValue)>>;

    /// Stage a statement batch
    async fn apply(&mut self, batch: UpdateBatch) -> Result<()>;

    /// Publish all staged mutations atomically
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard all staged mutations
    async fn rollback(self: Box<Self>);
}

/// First literal value of a predicate; fails with `MissingProperty` if
/// the node carries none
pub fn first_literal(
    statements: &[(String, ObjectValue)],
    path: &NodePath,
    predicate: &str,
) -> Result<String> {
    optional_literal(statements, predicate).ok_or_else(|| Error::MissingProperty {
        path: path.to_string(),
        predicate: predicate.to_string(),
    })
}

/// First literal value of a predicate, if any
#[must_use]
pub fn optional_literal(statements: &[(String, ObjectValue)], predicate: &str) -> Option<String> {
    statements.iter().find_map(|(p, object)| match object {
        ObjectValue::Literal(value) if p == predicate => Some(value.clone()),
        _ => None,
    })
}

/// All literal values of a predicate, in statement order
#[must_use]
pub fn literals(statements: &[(String, ObjectValue)], predicate: &str) -> Vec<String> {
    statements
        .iter()
        .filter_map(|(p, object)| match object {
            ObjectValue::Literal(value) if p == predicate => Some(value.clone()),
            _ => None,
        })
        .collect()
}

/// All referenced node paths of a predicate, in statement order
#[must_use]
pub fn references(statements: &[(String, ObjectValue)], predicate: &str) -> Vec<NodePath> {
    statements
        .iter()
        .filter_map(|(p, object)| match object {
            ObjectValue::Reference(target) if p == predicate => Some(target.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;

    fn sample() -> Vec<(String, ObjectValue)> {
        vec![
            (
                vocab::HAS_TITLE.to_string(),
                ObjectValue::Literal("first".into()),
            ),
            (
                vocab::HAS_REPRESENTATION.to_string(),
                ObjectValue::Reference(NodePath::new("/e/rep-1")),
            ),
            (
                vocab::HAS_TITLE.to_string(),
                ObjectValue::Literal("second".into()),
            ),
            (
                vocab::HAS_REPRESENTATION.to_string(),
                ObjectValue::Reference(NodePath::new("/e/rep-2")),
            ),
        ]
    }

    #[test]
    fn test_first_literal_and_missing() {
        let stmts = sample();
        let path = NodePath::new("/e");
        assert_eq!(
            first_literal(&stmts, &path, vocab::HAS_TITLE).unwrap(),
            "first"
        );
        let err = first_literal(&stmts, &path, vocab::HAS_MIME_TYPE).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_literals_and_references_preserve_order() {
        let stmts = sample();
        assert_eq!(literals(&stmts, vocab::HAS_TITLE), vec!["first", "second"]);
        let refs = references(&stmts, vocab::HAS_REPRESENTATION);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].last_segment(), "rep-1");
        assert_eq!(refs[1].last_segment(), "rep-2");
    }
}
