//! The hierarchical preservation record
//!
//! An intellectual entity holds an ordered list of representations,
//! each representation an ordered list of files, each file an ordered
//! list of bitstreams. All of these are immutable value objects once
//! built; identifiers left unset are generated at ingest time.

use crate::identifier::Identifier;
use crate::lifecycle::LifecycleState;
use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The top-level preservation record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntellectualEntity {
    pub identifier: Option<Identifier>,
    pub descriptive: Option<Metadata>,
    pub representations: Vec<Representation>,
    pub lifecycle: Option<LifecycleState>,
}

impl IntellectualEntity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    #[must_use]
    pub fn with_descriptive(mut self, descriptive: Metadata) -> Self {
        self.descriptive = Some(descriptive);
        self
    }

    #[must_use]
    pub fn with_representations(mut self, representations: Vec<Representation>) -> Self {
        self.representations = representations;
        self
    }

    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: LifecycleState) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }
}

/// One concrete rendition of an entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Representation {
    pub identifier: Option<Identifier>,
    pub title: Option<String>,
    pub technical: Option<Metadata>,
    pub source: Option<Metadata>,
    pub provenance: Option<Metadata>,
    pub rights: Option<Metadata>,
    pub files: Vec<File>,
}

impl Representation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_technical(mut self, technical: Metadata) -> Self {
        self.technical = Some(technical);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Metadata) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_provenance(mut self, provenance: Metadata) -> Self {
        self.provenance = Some(provenance);
        self
    }

    #[must_use]
    pub fn with_rights(mut self, rights: Metadata) -> Self {
        self.rights = Some(rights);
        self
    }

    #[must_use]
    pub fn with_files(mut self, files: Vec<File>) -> Self {
        self.files = files;
        self
    }
}

/// One binary artifact within a representation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct File {
    pub identifier: Option<Identifier>,
    pub filename: Option<String>,
    pub mimetype: Option<String>,
    /// Location the binary content is fetched from at ingest time
    pub source_uri: Option<String>,
    pub technical: Option<Metadata>,
    pub bitstreams: Vec<BitStream>,
}

impl File {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    #[must_use]
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    #[must_use]
    pub fn with_source_uri(mut self, source_uri: impl Into<String>) -> Self {
        self.source_uri = Some(source_uri.into());
        self
    }

    #[must_use]
    pub fn with_technical(mut self, technical: Metadata) -> Self {
        self.technical = Some(technical);
        self
    }

    #[must_use]
    pub fn with_bitstreams(mut self, bitstreams: Vec<BitStream>) -> Self {
        self.bitstreams = bitstreams;
        self
    }
}

/// A named sub-component of a file's content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BitStream {
    pub identifier: Option<Identifier>,
    pub bitstream_type: BitStreamType,
    pub technical: Option<Metadata>,
}

impl BitStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    #[must_use]
    pub fn with_bitstream_type(mut self, bitstream_type: BitStreamType) -> Self {
        self.bitstream_type = bitstream_type;
        self
    }

    #[must_use]
    pub fn with_technical(mut self, technical: Metadata) -> Self {
        self.technical = Some(technical);
        self
    }
}

/// Type tag of a bitstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitStreamType {
    #[default]
    Stream,
}

impl BitStreamType {
    /// The literal form recorded in the graph store
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "STREAM",
        }
    }
}

impl fmt::Display for BitStreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitStreamType {
    type Err = std::convert::Infallible;

    fn from_str(_s: &str) -> Result<Self, Self::Err> {
        Ok(Self::Stream)
    }
}
