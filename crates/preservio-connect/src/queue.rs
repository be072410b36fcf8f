//! Deferred ingest queue
//!
//! Queue membership lives as one literal per queued item on a
//! well-known queue node; each literal is a serialized [`QueueEntry`]
//! naming the entity id and its staging file. The staging write always
//! completes before the entry becomes visible, so every listed entry
//! has readable staged bytes behind it.

use crate::staging::StagingStore;
use preservio_common::config::StoreConfig;
use preservio_common::{Error, Result};
use preservio_graph::{GraphSession, GraphStore, NodePath, UpdateBuilder, literals, vocab};
use preservio_model::{Identifier, IntellectualEntity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// One queued item: the entity id the scheduler will ingest under and
/// the staging file holding its serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Identifier,
    pub staging_location: PathBuf,
    #[serde(default)]
    pub attempts: u32,
}

impl QueueEntry {
    fn to_literal(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_literal(literal: &str) -> Result<Self> {
        Ok(serde_json::from_str(literal)?)
    }
}

/// Durable staging area for entities submitted for deferred ingest
pub struct IngestQueue {
    store: Arc<dyn GraphStore>,
    staging: StagingStore,
    entity_root: NodePath,
    queue_node: NodePath,
    max_attempts: u32,
}

impl IngestQueue {
    pub fn new(
        store: Arc<dyn GraphStore>,
        staging: StagingStore,
        config: &StoreConfig,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            staging,
            entity_root: NodePath::new(&config.entity_root),
            queue_node: NodePath::new(&config.queue_node),
            max_attempts,
        }
    }

    /// Queue serialized entity bytes for deferred ingest
    ///
    /// The id is resolved up front (the entity's own identifier, else a
    /// generated one) and returned so the caller can poll lifecycle
    /// state immediately. Ids already stored or already queued are
    /// rejected here rather than failing invisibly at ingest time.
    pub async fn enqueue(&self, raw: &[u8]) -> Result<Identifier> {
        let entity: IntellectualEntity = serde_json::from_slice(raw)?;
        let id = entity
            .identifier
            .clone()
            .unwrap_or_else(Identifier::generate);

        let mut session = self.store.session().await?;
        match self.enqueue_in(session.as_mut(), &id, raw).await {
            Ok(()) => {
                session.commit().await?;
                debug!("queued entity '{id}' for deferred ingest");
                Ok(id)
            }
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }

    async fn enqueue_in(
        &self,
        session: &mut dyn GraphSession,
        id: &Identifier,
        raw: &[u8],
    ) -> Result<()> {
        if session
            .exists(&self.entity_root.child(id.as_str()))
            .await?
        {
            return Err(Error::already_exists(id.as_str()));
        }
        let queued = self.entries_in(session, vocab::HAS_ITEM).await?;
        if queued.iter().any(|entry| &entry.id == id) {
            return Err(Error::already_exists(id.as_str()));
        }

        // the staging write completes before the entry becomes visible
        let staging_location = self.staging.stage(raw).await?;

        if !session.exists(&self.queue_node).await? {
            session.create_node(&self.queue_node).await?;
        }
        let entry = QueueEntry {
            id: id.clone(),
            staging_location,
            attempts: 0,
        };
        let mut update = UpdateBuilder::new();
        update.add_property(&self.queue_node, vocab::HAS_ITEM, entry.to_literal()?);
        session.apply(update.render()).await
    }

    /// Currently queued entries, in insertion (drain) order
    ///
    /// Empty when the queue node does not exist yet.
    pub async fn list(&self) -> Result<Vec<QueueEntry>> {
        let session = self.store.session().await?;
        let result = self.entries_in(&*session, vocab::HAS_ITEM).await;
        session.rollback().await;
        result
    }

    /// Quarantined entries that exhausted their ingest attempts
    pub async fn failed(&self) -> Result<Vec<QueueEntry>> {
        let session = self.store.session().await?;
        let result = self.entries_in(&*session, vocab::HAS_FAILED_ITEM).await;
        session.rollback().await;
        result
    }

    async fn entries_in(
        &self,
        session: &dyn GraphSession,
        predicate: &str,
    ) -> Result<Vec<QueueEntry>> {
        if !session.exists(&self.queue_node).await? {
            return Ok(Vec::new());
        }
        let statements = session.statements(&self.queue_node).await?;
        let mut entries = Vec::new();
        for literal in literals(&statements, predicate) {
            match QueueEntry::from_literal(&literal) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("skipping malformed queue entry '{literal}': {e}"),
            }
        }
        Ok(entries)
    }

    /// Read the staged bytes behind a queue entry
    pub async fn read_staged(&self, entry: &QueueEntry) -> Result<Vec<u8>> {
        self.staging.read(&entry.staging_location).await
    }

    /// Remove exactly this entry from the queue and drop its staging file
    pub async fn dequeue(&self, entry: &QueueEntry) -> Result<()> {
        let mut update = UpdateBuilder::new();
        update.remove(&self.queue_node, vocab::HAS_ITEM, entry.to_literal()?);

        let mut session = self.store.session().await?;
        match session.apply(update.render()).await {
            Ok(()) => session.commit().await?,
            Err(e) => {
                session.rollback().await;
                return Err(e);
            }
        }
        // queue membership is already gone; a leftover staging file is
        // tolerable garbage
        if let Err(e) = self.staging.remove(&entry.staging_location).await {
            warn!(
                "failed to remove staging file {}: {e}",
                entry.staging_location.display()
            );
        }
        Ok(())
    }

    /// Record a failed ingest attempt for an entry
    ///
    /// Rewrites the entry with an incremented attempt count; once the
    /// configured maximum is reached the entry moves to the dead-letter
    /// list instead and stops being drained. Its staging file is kept
    /// for inspection.
    pub async fn record_failure(&self, entry: &QueueEntry) -> Result<()> {
        let updated = QueueEntry {
            attempts: entry.attempts + 1,
            ..entry.clone()
        };
        let mut update = UpdateBuilder::new();
        update.remove(&self.queue_node, vocab::HAS_ITEM, entry.to_literal()?);
        if updated.attempts >= self.max_attempts {
            error!(
                "quarantining entity '{}' after {} failed ingest attempts",
                updated.id, updated.attempts
            );
            update.add_property(
                &self.queue_node,
                vocab::HAS_FAILED_ITEM,
                updated.to_literal()?,
            );
        } else {
            update.add_property(&self.queue_node, vocab::HAS_ITEM, updated.to_literal()?);
        }

        let mut session = self.store.session().await?;
        match session.apply(update.render()).await {
            Ok(()) => session.commit().await,
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preservio_graph::MemoryGraphStore;
    use preservio_model::IntellectualEntity;

    async fn queue_with_store() -> (IngestQueue, MemoryGraphStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryGraphStore::new();
        let staging = StagingStore::open(dir.path().join("queue"))
            .await
            .expect("staging");
        let queue = IngestQueue::new(
            Arc::new(store.clone()),
            staging,
            &StoreConfig::default(),
            3,
        );
        (queue, store, dir)
    }

    fn entity_bytes(id: &str) -> Vec<u8> {
        let entity =
            IntellectualEntity::new().with_identifier(Identifier::new_unchecked(id));
        serde_json::to_vec(&entity).expect("serialize")
    }

    #[tokio::test]
    async fn test_enqueue_lists_entry_with_readable_staging_file() {
        let (queue, _store, _dir) = queue_with_store().await;
        let raw = entity_bytes("entity-2");

        let id = queue.enqueue(&raw).await.unwrap();
        assert_eq!(id.as_str(), "entity-2");

        let entries = queue.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].attempts, 0);
        // durability: every listed entry has readable staged bytes
        assert_eq!(queue.read_staged(&entries[0]).await.unwrap(), raw);
    }

    #[tokio::test]
    async fn test_enqueue_generates_id_when_absent() {
        let (queue, _store, _dir) = queue_with_store().await;
        let raw = serde_json::to_vec(&IntellectualEntity::new()).unwrap();
        let id = queue.enqueue(&raw).await.unwrap();
        assert!(!id.as_str().is_empty());
        assert_eq!(queue.list().await.unwrap()[0].id, id);
    }

    #[tokio::test]
    async fn test_enqueue_same_id_twice_conflicts() {
        let (queue, _store, _dir) = queue_with_store().await;
        queue.enqueue(&entity_bytes("entity-2")).await.unwrap();
        let err = queue.enqueue(&entity_bytes("entity-2")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(queue.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_garbage_is_codec_error() {
        let (queue, _store, _dir) = queue_with_store().await;
        let err = queue.enqueue(b"not an entity").await.unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
        assert!(queue.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dequeue_removes_entry_and_staging_file() {
        let (queue, _store, _dir) = queue_with_store().await;
        queue.enqueue(&entity_bytes("entity-2")).await.unwrap();
        let entry = queue.list().await.unwrap().remove(0);

        queue.dequeue(&entry).await.unwrap();
        assert!(queue.list().await.unwrap().is_empty());
        assert!(queue.read_staged(&entry).await.is_err());
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, _store, _dir) = queue_with_store().await;
        queue.enqueue(&entity_bytes("a")).await.unwrap();
        queue.enqueue(&entity_bytes("b")).await.unwrap();
        queue.enqueue(&entity_bytes("c")).await.unwrap();
        let ids: Vec<String> = queue
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id.into_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_record_failure_until_quarantine() {
        let (queue, _store, _dir) = queue_with_store().await;
        queue.enqueue(&entity_bytes("entity-2")).await.unwrap();

        // two failures keep the entry queued with bumped attempts
        for expected in 1..=2 {
            let entry = queue.list().await.unwrap().remove(0);
            queue.record_failure(&entry).await.unwrap();
            let entries = queue.list().await.unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].attempts, expected);
        }

        // third failure hits max_attempts and quarantines
        let entry = queue.list().await.unwrap().remove(0);
        assert_eq!(entry.attempts, 2);
        queue.record_failure(&entry).await.unwrap();
        assert!(queue.list().await.unwrap().is_empty());
        let failed = queue.failed().await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].attempts, 3);
        // staging file is retained for inspection
        assert!(queue.read_staged(&failed[0]).await.is_ok());
    }
}
