//! Entity graph mapper
//!
//! Walks the hierarchical model top-down to produce stored nodes and
//! update statements, and walks stored relation statements bottom-up to
//! reconstruct the model. Every store or fetch call runs inside one
//! session: committed once at the end of a store, rolled back on any
//! failure and after reads, so no partial entity ever becomes visible.

use crate::content::ContentSource;
use bytes::Bytes;
use preservio_common::config::StoreConfig;
use preservio_common::time::epoch_millis;
use preservio_common::{Error, Result};
use preservio_graph::{
    GraphSession, GraphStore, NodePath, UpdateBuilder, first_literal, optional_literal,
    references, slot, vocab,
};
use preservio_model::{
    BitStream, File, Identifier, IntellectualEntity, LifecycleState, Metadata, MetadataCodec,
    Representation, State, TypeRegistry,
};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Bidirectional mapping between the entity model and the graph store
pub struct EntityMapper {
    store: Arc<dyn GraphStore>,
    codec: Arc<dyn MetadataCodec>,
    content: Arc<dyn ContentSource>,
    registry: TypeRegistry,
    entity_root: NodePath,
}

impl EntityMapper {
    pub fn new(
        store: Arc<dyn GraphStore>,
        codec: Arc<dyn MetadataCodec>,
        content: Arc<dyn ContentSource>,
        registry: TypeRegistry,
        config: &StoreConfig,
    ) -> Self {
        Self {
            store,
            codec,
            content,
            registry,
            entity_root: NodePath::new(&config.entity_root),
        }
    }

    /// Path of an entity node
    #[must_use]
    pub fn entity_path(&self, id: &Identifier) -> NodePath {
        self.entity_root.child(id.as_str())
    }

    // ---- Store direction ----

    /// Store a whole entity tree and return its resolved identifier
    ///
    /// The identifier is the caller-supplied one, else the entity's own,
    /// else freshly generated. Fails with `AlreadyExists` if a node is
    /// already stored under the resolved id; the store is left unchanged
    /// by a failed call.
    pub async fn store_entity(
        &self,
        entity: &IntellectualEntity,
        id: Option<Identifier>,
    ) -> Result<Identifier> {
        let entity_id = id
            .or_else(|| entity.identifier.clone())
            .unwrap_or_else(Identifier::generate);

        let mut session = self.store.session().await?;
        match self.store_tree(session.as_mut(), entity, &entity_id).await {
            Ok(()) => {
                session.commit().await?;
                info!("ingested entity '{entity_id}'");
                Ok(entity_id)
            }
            Err(e) => {
                session.rollback().await;
                Err(e)
            }
        }
    }

    async fn store_tree(
        &self,
        session: &mut dyn GraphSession,
        entity: &IntellectualEntity,
        id: &Identifier,
    ) -> Result<()> {
        let path = self.entity_path(id);
        if session.exists(&path).await? {
            return Err(Error::already_exists(id.as_str()));
        }
        session.create_node(&path).await?;

        let mut update = UpdateBuilder::new();
        if let Some(descriptive) = &entity.descriptive {
            self.add_metadata(session, &mut update, descriptive, &path.child(slot::DESCRIPTIVE))
                .await?;
        }
        self.add_representations(session, &mut update, &entity.representations, &path)
            .await?;

        update.add_property(&path, vocab::HAS_LIFECYCLE_STATE, State::Ingested.as_str());
        update.add_property(
            &path,
            vocab::HAS_LIFECYCLE_STATE_DETAILS,
            format!("successfully ingested at {}", epoch_millis()),
        );
        update.add_type_tag(&path, "intellectualentity");

        session.apply(update.render()).await
    }

    async fn add_representations(
        &self,
        session: &mut dyn GraphSession,
        update: &mut UpdateBuilder,
        representations: &[Representation],
        entity_path: &NodePath,
    ) -> Result<()> {
        for representation in representations {
            let rep_id = representation
                .identifier
                .clone()
                .unwrap_or_else(Identifier::generate);
            let rep_path = entity_path.child(rep_id.as_str());
            session.create_node(&rep_path).await?;

            if let Some(technical) = &representation.technical {
                self.add_metadata(session, update, technical, &rep_path.child(slot::TECHNICAL))
                    .await?;
            }
            if let Some(source) = &representation.source {
                self.add_metadata(session, update, source, &rep_path.child(slot::SOURCE))
                    .await?;
            }
            if let Some(rights) = &representation.rights {
                self.add_metadata(session, update, rights, &rep_path.child(slot::RIGHTS))
                    .await?;
            }
            if let Some(provenance) = &representation.provenance {
                self.add_metadata(session, update, provenance, &rep_path.child(slot::PROVENANCE))
                    .await?;
            }

            self.add_files(session, update, &representation.files, &rep_path)
                .await?;

            update.add_type_tag(&rep_path, "representation");
            if let Some(title) = &representation.title {
                update.add_property(&rep_path, vocab::HAS_TITLE, title);
            }
            update.add_reference(entity_path, vocab::HAS_REPRESENTATION, &rep_path);
        }
        Ok(())
    }

    async fn add_files(
        &self,
        session: &mut dyn GraphSession,
        update: &mut UpdateBuilder,
        files: &[File],
        rep_path: &NodePath,
    ) -> Result<()> {
        for file in files {
            let file_id = file.identifier.clone().unwrap_or_else(Identifier::generate);
            let file_path = rep_path.child(file_id.as_str());

            let uri = file.source_uri.as_deref().ok_or_else(|| {
                Error::content_fetch(format!("file '{file_id}'"), "no ingest source set")
            })?;
            debug!("fetching file content from {uri}");
            let data = self.content.fetch(uri).await?;

            session.create_node(&file_path).await?;
            let mime = file.mimetype.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
            session
                .put_content(&file_path.child(slot::DATA), mime, data)
                .await?;

            if let Some(technical) = &file.technical {
                self.add_metadata(session, update, technical, &file_path.child(slot::TECHNICAL))
                    .await?;
            }
            self.add_bitstreams(session, update, &file.bitstreams, &file_path)
                .await?;

            update.add_type_tag(&file_path, "file");
            if let Some(filename) = &file.filename {
                update.add_property(&file_path, vocab::HAS_FILE_NAME, filename);
            }
            if let Some(mimetype) = &file.mimetype {
                update.add_property(&file_path, vocab::HAS_MIME_TYPE, mimetype);
            }
            update.add_property(&file_path, vocab::HAS_INGEST_SOURCE, uri);
            update.add_reference(rep_path, vocab::HAS_FILE, &file_path);
        }
        Ok(())
    }

    async fn add_bitstreams(
        &self,
        session: &mut dyn GraphSession,
        update: &mut UpdateBuilder,
        bitstreams: &[BitStream],
        file_path: &NodePath,
    ) -> Result<()> {
        for bitstream in bitstreams {
            let bs_id = bitstream
                .identifier
                .clone()
                .unwrap_or_else(Identifier::generate);
            let bs_path = file_path.child(bs_id.as_str());
            session.create_node(&bs_path).await?;

            if let Some(technical) = &bitstream.technical {
                self.add_metadata(session, update, technical, &bs_path.child(slot::TECHNICAL))
                    .await?;
            }

            update.add_type_tag(&bs_path, "bitstream");
            update.add_property(
                &bs_path,
                vocab::HAS_BITSTREAM_TYPE,
                bitstream.bitstream_type.as_str(),
            );
            update.add_reference(file_path, vocab::HAS_BITSTREAM, &bs_path);
        }
        Ok(())
    }

    /// Write one metadata payload as a child node and tag it with its
    /// classified (type, schema) pair
    async fn add_metadata(
        &self,
        session: &mut dyn GraphSession,
        update: &mut UpdateBuilder,
        metadata: &Metadata,
        path: &NodePath,
    ) -> Result<()> {
        let raw = self.codec.serialize(metadata)?;
        session
            .put_content(path, self.codec.content_type(), raw)
            .await?;
        let tag = self.registry.classify(metadata);
        update.add_type_tag(path, tag.name);
        update.add_property(path, vocab::HAS_SCHEMA, tag.schema);
        Ok(())
    }

    // ---- Fetch direction ----

    /// Reconstruct a whole entity tree from the store
    pub async fn fetch_entity(&self, id: &Identifier) -> Result<IntellectualEntity> {
        let session = self.store.session().await?;
        let result = self.read_entity(&*session, id).await;
        session.rollback().await;
        result
    }

    /// Fetch several entities; the first failing id aborts
    pub async fn fetch_entities(&self, ids: &[Identifier]) -> Result<Vec<IntellectualEntity>> {
        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            entities.push(self.fetch_entity(id).await?);
        }
        Ok(entities)
    }

    /// Fetch one representation of a stored entity
    pub async fn fetch_representation(
        &self,
        entity_id: &Identifier,
        rep_id: &Identifier,
    ) -> Result<Representation> {
        let path = self.entity_path(entity_id).child(rep_id.as_str());
        let session = self.store.session().await?;
        let result = match session.exists(&path).await {
            Ok(true) => self.read_representation(&*session, &path).await,
            Ok(false) => Err(Error::not_found(format!(
                "representation '{rep_id}' of entity '{entity_id}'"
            ))),
            Err(e) => Err(e),
        };
        session.rollback().await;
        result
    }

    /// Fetch one file of a stored entity
    pub async fn fetch_file(
        &self,
        entity_id: &Identifier,
        rep_id: &Identifier,
        file_id: &Identifier,
    ) -> Result<File> {
        let path = self
            .entity_path(entity_id)
            .child(rep_id.as_str())
            .child(file_id.as_str());
        let session = self.store.session().await?;
        let result = match session.exists(&path).await {
            Ok(true) => self.read_file(&*session, &path).await,
            Ok(false) => Err(Error::not_found(format!(
                "file '{file_id}' of entity '{entity_id}'"
            ))),
            Err(e) => Err(e),
        };
        session.rollback().await;
        result
    }

    /// Fetch one bitstream of a stored entity
    pub async fn fetch_bitstream(
        &self,
        entity_id: &Identifier,
        rep_id: &Identifier,
        file_id: &Identifier,
        bs_id: &Identifier,
    ) -> Result<BitStream> {
        let path = self
            .entity_path(entity_id)
            .child(rep_id.as_str())
            .child(file_id.as_str())
            .child(bs_id.as_str());
        let session = self.store.session().await?;
        let result = match session.exists(&path).await {
            Ok(true) => self.read_bitstream(&*session, &path).await,
            Ok(false) => Err(Error::not_found(format!(
                "bitstream '{bs_id}' of entity '{entity_id}'"
            ))),
            Err(e) => Err(e),
        };
        session.rollback().await;
        result
    }

    /// Fetch the metadata payload stored at a node path
    pub async fn fetch_metadata(&self, path: &NodePath) -> Result<Metadata> {
        let session = self.store.session().await?;
        let result = match self.read_metadata(&*session, path).await {
            Ok(Some(metadata)) => Ok(metadata),
            Ok(None) => Err(Error::not_found(format!("no metadata at {path}"))),
            Err(e) => Err(e),
        };
        session.rollback().await;
        result
    }

    /// Fetch the binary content stored for a file
    pub async fn fetch_file_content(
        &self,
        entity_id: &Identifier,
        rep_id: &Identifier,
        file_id: &Identifier,
    ) -> Result<Bytes> {
        let path = self
            .entity_path(entity_id)
            .child(rep_id.as_str())
            .child(file_id.as_str())
            .child(slot::DATA);
        let session = self.store.session().await?;
        let result = session.get_content(&path).await;
        session.rollback().await;
        result
    }

    async fn read_entity(
        &self,
        session: &dyn GraphSession,
        id: &Identifier,
    ) -> Result<IntellectualEntity> {
        let path = self.entity_path(id);
        if !session.exists(&path).await? {
            return Err(Error::not_found(format!("entity '{id}'")));
        }
        let statements = session.statements(&path).await?;

        let descriptive = self
            .read_metadata(session, &path.child(slot::DESCRIPTIVE))
            .await?;

        let mut representations = Vec::new();
        for rep_path in references(&statements, vocab::HAS_REPRESENTATION) {
            representations.push(self.read_representation(session, &rep_path).await?);
        }

        let state = first_literal(&statements, &path, vocab::HAS_LIFECYCLE_STATE)?;
        let details = first_literal(&statements, &path, vocab::HAS_LIFECYCLE_STATE_DETAILS)?;
        let lifecycle =
            LifecycleState::new(state.parse().unwrap_or(State::Other), details);

        let mut entity = IntellectualEntity::new()
            .with_identifier(id.clone())
            .with_representations(representations)
            .with_lifecycle(lifecycle);
        if let Some(descriptive) = descriptive {
            entity = entity.with_descriptive(descriptive);
        }
        Ok(entity)
    }

    async fn read_representation(
        &self,
        session: &dyn GraphSession,
        path: &NodePath,
    ) -> Result<Representation> {
        let statements = session.statements(path).await?;
        let mut representation = Representation::new()
            .with_identifier(Identifier::new_unchecked(path.last_segment()));

        if let Some(title) = optional_literal(&statements, vocab::HAS_TITLE) {
            representation = representation.with_title(title);
        }
        if let Some(md) = self.read_metadata(session, &path.child(slot::TECHNICAL)).await? {
            representation = representation.with_technical(md);
        }
        if let Some(md) = self.read_metadata(session, &path.child(slot::SOURCE)).await? {
            representation = representation.with_source(md);
        }
        if let Some(md) = self.read_metadata(session, &path.child(slot::RIGHTS)).await? {
            representation = representation.with_rights(md);
        }
        if let Some(md) = self
            .read_metadata(session, &path.child(slot::PROVENANCE))
            .await?
        {
            representation = representation.with_provenance(md);
        }

        let mut files = Vec::new();
        for file_path in references(&statements, vocab::HAS_FILE) {
            files.push(self.read_file(session, &file_path).await?);
        }
        Ok(representation.with_files(files))
    }

    async fn read_file(&self, session: &dyn GraphSession, path: &NodePath) -> Result<File> {
        let statements = session.statements(path).await?;
        let mut file = File::new().with_identifier(Identifier::new_unchecked(path.last_segment()));

        if let Some(filename) = optional_literal(&statements, vocab::HAS_FILE_NAME) {
            file = file.with_filename(filename);
        }
        if let Some(mimetype) = optional_literal(&statements, vocab::HAS_MIME_TYPE) {
            file = file.with_mimetype(mimetype);
        }
        if let Some(source_uri) = optional_literal(&statements, vocab::HAS_INGEST_SOURCE) {
            file = file.with_source_uri(source_uri);
        }
        if let Some(md) = self.read_metadata(session, &path.child(slot::TECHNICAL)).await? {
            file = file.with_technical(md);
        }

        let mut bitstreams = Vec::new();
        for bs_path in references(&statements, vocab::HAS_BITSTREAM) {
            bitstreams.push(self.read_bitstream(session, &bs_path).await?);
        }
        Ok(file.with_bitstreams(bitstreams))
    }

    async fn read_bitstream(
        &self,
        session: &dyn GraphSession,
        path: &NodePath,
    ) -> Result<BitStream> {
        let statements = session.statements(path).await?;
        let mut bitstream =
            BitStream::new().with_identifier(Identifier::new_unchecked(path.last_segment()));

        if let Some(bs_type) = optional_literal(&statements, vocab::HAS_BITSTREAM_TYPE) {
            bitstream = bitstream.with_bitstream_type(bs_type.parse().unwrap_or_default());
        }
        if let Some(md) = self.read_metadata(session, &path.child(slot::TECHNICAL)).await? {
            bitstream = bitstream.with_technical(md);
        }
        Ok(bitstream)
    }

    async fn read_metadata(
        &self,
        session: &dyn GraphSession,
        path: &NodePath,
    ) -> Result<Option<Metadata>> {
        match session.get_content(path).await {
            Ok(raw) => Ok(Some(self.codec.deserialize(&raw)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
