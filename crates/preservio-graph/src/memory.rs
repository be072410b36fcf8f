//! In-memory graph store
//!
//! A transactional implementation of the store boundary used by tests
//! and the demo daemon. Sessions stage node creations, content writes
//! and statement batches; commit re-validates and applies everything
//! under one write guard, so concurrent sessions observe either all of
//! a commit or none of it.

use crate::path::NodePath;
use crate::statement::{ObjectValue, Statement, StatementOp, UpdateBatch};
use crate::store::{GraphSession, GraphStore};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use preservio_common::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
struct NodeRecord {
    statements: Vec<(String, ObjectValue)>,
    content: Option<(String, Bytes)>,
}

#[derive(Debug, Default)]
struct GraphData {
    nodes: HashMap<NodePath, NodeRecord>,
}

/// In-memory transactional graph store
#[derive(Debug, Default, Clone)]
pub struct MemoryGraphStore {
    data: Arc<RwLock<GraphData>>,
}

impl MemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed nodes, for tests and diagnostics
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.data.read().nodes.len()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn session(&self) -> Result<Box<dyn GraphSession>> {
        Ok(Box::new(MemorySession {
            data: Arc::clone(&self.data),
            created: Vec::new(),
            contents: Vec::new(),
            staged: Vec::new(),
        }))
    }
}

struct MemorySession {
    data: Arc<RwLock<GraphData>>,
    created: Vec<NodePath>,
    contents: Vec<(NodePath, String, Bytes)>,
    staged: Vec<Statement>,
}

impl MemorySession {
    fn staged_node(&self, path: &NodePath) -> bool {
        self.created.contains(path) || self.contents.iter().any(|(p, _, _)| p == path)
    }

    fn node_exists(&self, path: &NodePath) -> bool {
        self.staged_node(path) || self.data.read().nodes.contains_key(path)
    }

    fn effective_statements(&self, path: &NodePath) -> Vec<(String, ObjectValue)> {
        let mut statements = self
            .data
            .read()
            .nodes
            .get(path)
            .map(|record| record.statements.clone())
            .unwrap_or_default();
        for statement in self.staged.iter().filter(|s| &s.subject == path) {
            apply_statement(&mut statements, statement);
        }
        statements
    }
}

fn apply_statement(statements: &mut Vec<(String, ObjectValue)>, statement: &Statement) {
    match statement.op {
        StatementOp::Insert => {
            statements.push((statement.predicate.clone(), statement.object.clone()));
        }
        StatementOp::Delete => {
            statements.retain(|(predicate, object)| {
                predicate != &statement.predicate || object != &statement.object
            });
        }
    }
}

#[async_trait]
impl GraphSession for MemorySession {
    async fn exists(&self, path: &NodePath) -> Result<bool> {
        Ok(self.node_exists(path))
    }

    async fn create_node(&mut self, path: &NodePath) -> Result<()> {
        if self.node_exists(path) {
            return Err(Error::AlreadyExists(path.to_string()));
        }
        self.created.push(path.clone());
        Ok(())
    }

    async fn put_content(
        &mut self,
        path: &NodePath,
        content_type: &str,
        content: Bytes,
    ) -> Result<()> {
        self.contents
            .push((path.clone(), content_type.to_string(), content));
        Ok(())
    }

    async fn get_content(&self, path: &NodePath) -> Result<Bytes> {
        // last staged write wins over committed content
        if let Some((_, _, content)) = self.contents.iter().rev().find(|(p, _, _)| p == path) {
            return Ok(content.clone());
        }
        self.data
            .read()
            .nodes
            .get(path)
            .and_then(|record| record.content.as_ref())
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Error::not_found(format!("no content at {path}")))
    }

    async fn statements(&self, path: &NodePath) -> Result<Vec<(String, ObjectValue)>> {
        if !self.node_exists(path) {
            return Err(Error::not_found(format!("no node at {path}")));
        }
        Ok(self.effective_statements(path))
    }

    async fn apply(&mut self, batch: UpdateBatch) -> Result<()> {
        self.staged.extend(batch);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Self {
            data,
            created,
            contents,
            staged,
        } = *self;
        let mut guard = data.write();
        // conflicting concurrent create surfaces as an opaque store failure
        for path in &created {
            if guard.nodes.contains_key(path) {
                return Err(Error::store(format!(
                    "conflicting write: node {path} already exists"
                )));
            }
        }
        for path in created {
            guard.nodes.insert(path, NodeRecord::default());
        }
        for (path, content_type, content) in contents {
            guard.nodes.entry(path).or_default().content = Some((content_type, content));
        }
        for statement in &staged {
            let record = guard.nodes.entry(statement.subject.clone()).or_default();
            apply_statement(&mut record.statements, statement);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::UpdateBuilder;
    use crate::vocab;

    async fn session(store: &MemoryGraphStore) -> Box<dyn GraphSession> {
        store.session().await.expect("session")
    }

    #[tokio::test]
    async fn test_commit_publishes_staged_nodes() {
        let store = MemoryGraphStore::new();
        let path = NodePath::new("/objects/scape/entities/entity-1");

        let mut s = session(&store).await;
        s.create_node(&path).await.unwrap();
        assert!(s.exists(&path).await.unwrap());

        // invisible to a second session until commit
        let other = session(&store).await;
        assert!(!other.exists(&path).await.unwrap());

        s.commit().await.unwrap();
        assert!(other.exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_rollback_discards_everything() {
        let store = MemoryGraphStore::new();
        let path = NodePath::new("/a");

        let mut s = session(&store).await;
        s.create_node(&path).await.unwrap();
        s.put_content(&path.child("DATA"), "text/plain", Bytes::from_static(b"x"))
            .await
            .unwrap();
        s.rollback().await;

        let s = session(&store).await;
        assert!(!s.exists(&path).await.unwrap());
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let store = MemoryGraphStore::new();
        let path = NodePath::new("/a");

        let mut s = session(&store).await;
        s.create_node(&path).await.unwrap();
        let err = s.create_node(&path).await.unwrap_err();
        assert!(err.is_conflict());
        s.commit().await.unwrap();

        let mut s = session(&store).await;
        let err = s.create_node(&path).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_concurrent_create_conflicts_at_commit() {
        let store = MemoryGraphStore::new();
        let path = NodePath::new("/a");

        let mut first = session(&store).await;
        let mut second = session(&store).await;
        first.create_node(&path).await.unwrap();
        second.create_node(&path).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_statement_order_and_exact_delete() {
        let store = MemoryGraphStore::new();
        let queue = NodePath::new("/objects/scape/queue");

        let mut s = session(&store).await;
        s.create_node(&queue).await.unwrap();
        let mut builder = UpdateBuilder::new();
        builder.add_property(&queue, vocab::HAS_ITEM, "one");
        builder.add_property(&queue, vocab::HAS_ITEM, "two");
        builder.add_property(&queue, vocab::HAS_ITEM, "three");
        s.apply(builder.render()).await.unwrap();
        s.commit().await.unwrap();

        let mut s = session(&store).await;
        let mut builder = UpdateBuilder::new();
        builder.remove(&queue, vocab::HAS_ITEM, "two");
        s.apply(builder.render()).await.unwrap();
        s.commit().await.unwrap();

        let s = session(&store).await;
        let statements = s.statements(&queue).await.unwrap();
        let items = crate::store::literals(&statements, vocab::HAS_ITEM);
        assert_eq!(items, vec!["one", "three"]);
    }

    #[tokio::test]
    async fn test_staged_statements_visible_in_session() {
        let store = MemoryGraphStore::new();
        let path = NodePath::new("/a");

        let mut s = session(&store).await;
        s.create_node(&path).await.unwrap();
        let mut builder = UpdateBuilder::new();
        builder.add_property(&path, vocab::HAS_TITLE, "staged");
        s.apply(builder.render()).await.unwrap();

        let statements = s.statements(&path).await.unwrap();
        assert_eq!(
            crate::store::optional_literal(&statements, vocab::HAS_TITLE).as_deref(),
            Some("staged")
        );
    }

    #[tokio::test]
    async fn test_content_round_trip() {
        let store = MemoryGraphStore::new();
        let data = NodePath::new("/a/DATA");

        let mut s = session(&store).await;
        s.put_content(&data, "application/octet-stream", Bytes::from_static(b"bytes"))
            .await
            .unwrap();
        // staged content readable within the session
        assert_eq!(s.get_content(&data).await.unwrap(), Bytes::from_static(b"bytes"));
        s.commit().await.unwrap();

        let s = session(&store).await;
        assert_eq!(s.get_content(&data).await.unwrap(), Bytes::from_static(b"bytes"));
        let err = s.get_content(&NodePath::new("/missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
