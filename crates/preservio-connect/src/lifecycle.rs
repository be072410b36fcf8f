//! Lifecycle tracking
//!
//! The stored entity node is authoritative for its state; an entity
//! that is only queued for deferred ingest reports `INGESTING` until
//! the scheduler promotes it to a real stored entity.

use crate::queue::IngestQueue;
use preservio_common::config::StoreConfig;
use preservio_common::{Error, Result};
use preservio_graph::{GraphSession, GraphStore, NodePath, first_literal, vocab};
use preservio_model::{Identifier, LifecycleState, State};
use std::sync::Arc;

/// Derives the lifecycle state of an entity from the store and the queue
pub struct LifecycleTracker {
    store: Arc<dyn GraphStore>,
    queue: Arc<IngestQueue>,
    entity_root: NodePath,
}

impl LifecycleTracker {
    pub fn new(store: Arc<dyn GraphStore>, queue: Arc<IngestQueue>, config: &StoreConfig) -> Self {
        Self {
            store,
            queue,
            entity_root: NodePath::new(&config.entity_root),
        }
    }

    /// Current lifecycle state of an entity
    ///
    /// A caller can poll immediately after an asynchronous submission
    /// and observe `INGESTING` until the entity is actually stored.
    pub async fn state(&self, id: &Identifier) -> Result<LifecycleState> {
        let path = self.entity_root.child(id.as_str());

        let session = self.store.session().await?;
        let stored = match session.exists(&path).await {
            Ok(true) => {
                let result = session.statements(&path).await.and_then(|statements| {
                    let state = first_literal(&statements, &path, vocab::HAS_LIFECYCLE_STATE)?;
                    let details =
                        first_literal(&statements, &path, vocab::HAS_LIFECYCLE_STATE_DETAILS)?;
                    Ok(LifecycleState::new(
                        state.parse().unwrap_or(State::Other),
                        details,
                    ))
                });
                Some(result)
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        };
        session.rollback().await;

        if let Some(result) = stored {
            return result;
        }

        if self.queue.list().await?.iter().any(|entry| &entry.id == id) {
            return Ok(LifecycleState::ingesting());
        }
        Err(Error::not_found(format!("no lifecycle for entity '{id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentSource;
    use crate::mapper::EntityMapper;
    use crate::staging::StagingStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use preservio_graph::MemoryGraphStore;
    use preservio_model::{IntellectualEntity, JsonCodec, TypeRegistry};

    struct StaticContent;

    #[async_trait]
    impl ContentSource for StaticContent {
        async fn fetch(&self, _uri: &str) -> Result<Bytes> {
            Ok(Bytes::new())
        }
    }

    async fn tracker_setup() -> (LifecycleTracker, Arc<IngestQueue>, EntityMapper, tempfile::TempDir)
    {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryGraphStore::new();
        let config = StoreConfig::default();
        let staging = StagingStore::open(dir.path().join("queue")).await.expect("staging");
        let queue = Arc::new(IngestQueue::new(
            Arc::new(store.clone()),
            staging,
            &config,
            3,
        ));
        let mapper = EntityMapper::new(
            Arc::new(store.clone()),
            Arc::new(JsonCodec),
            Arc::new(StaticContent),
            TypeRegistry::default(),
            &config,
        );
        let tracker = LifecycleTracker::new(Arc::new(store), Arc::clone(&queue), &config);
        (tracker, queue, mapper, dir)
    }

    #[tokio::test]
    async fn test_queued_entity_is_ingesting() {
        let (tracker, queue, _mapper, _dir) = tracker_setup().await;
        let entity =
            IntellectualEntity::new().with_identifier(Identifier::new_unchecked("entity-2"));
        let raw = serde_json::to_vec(&entity).unwrap();
        let id = queue.enqueue(&raw).await.unwrap();

        let state = tracker.state(&id).await.unwrap();
        assert_eq!(state.state, State::Ingesting);
        assert_eq!(state.details, "");
    }

    #[tokio::test]
    async fn test_stored_entity_state_is_authoritative() {
        let (tracker, _queue, mapper, _dir) = tracker_setup().await;
        let entity =
            IntellectualEntity::new().with_identifier(Identifier::new_unchecked("entity-1"));
        let id = mapper.store_entity(&entity, None).await.unwrap();

        let state = tracker.state(&id).await.unwrap();
        assert_eq!(state.state, State::Ingested);
        assert!(state.details.starts_with("successfully ingested at "));
    }

    #[tokio::test]
    async fn test_unknown_entity_is_not_found() {
        let (tracker, _queue, _mapper, _dir) = tracker_setup().await;
        let err = tracker
            .state(&Identifier::new_unchecked("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
