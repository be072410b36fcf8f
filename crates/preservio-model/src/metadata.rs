//! Metadata payloads and their type classification
//!
//! The core never inspects a payload beyond its declared kind: the body
//! is an opaque blob, and classification maps the kind to the fixed
//! (type name, schema URI) pair recorded on the stored metadata node.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque metadata payload tagged with its declared kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Declared kind, used only for classification
    pub kind: MetadataKind,
    /// Schema-specific content, uninterpreted by the core
    pub body: serde_json::Value,
}

impl Metadata {
    /// Create a payload from a kind and its body
    #[must_use]
    pub const fn new(kind: MetadataKind, body: serde_json::Value) -> Self {
        Self { kind, body }
    }
}

/// Declared kind of a metadata payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataKind {
    DublinCore,
    Gbs,
    Fits,
    AudioMd,
    Marc21,
    Mix,
    VideoMd,
    PremisProvenance,
    PremisRights,
    TextMd,
    /// A kind this deployment has not registered a mapping for
    Other(String),
}

/// The (type name, schema URI) pair recorded on a stored metadata node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag {
    pub name: String,
    pub schema: String,
}

impl TypeTag {
    fn new(name: &str, schema: &str) -> Self {
        Self {
            name: name.to_string(),
            schema: schema.to_string(),
        }
    }

    /// The sentinel tag for unrecognized payload kinds
    #[must_use]
    pub fn unknown() -> Self {
        Self::new("unknown", "")
    }
}

/// Registry mapping payload kinds to their type tags
///
/// Extensible via [`TypeRegistry::register`] rather than a conditional
/// chain; unregistered kinds classify to the `("unknown", "")`
/// sentinel.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    tags: HashMap<MetadataKind, TypeTag>,
}

impl TypeRegistry {
    /// An empty registry with no registered kinds
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    /// Register (or replace) the tag for a kind
    pub fn register(&mut self, kind: MetadataKind, name: impl Into<String>, schema: impl Into<String>) {
        self.tags.insert(
            kind,
            TypeTag {
                name: name.into(),
                schema: schema.into(),
            },
        );
    }

    /// Classify a payload into its (type name, schema URI) pair
    #[must_use]
    pub fn classify(&self, metadata: &Metadata) -> TypeTag {
        self.tags
            .get(&metadata.kind)
            .cloned()
            .unwrap_or_else(TypeTag::unknown)
    }
}

impl Default for TypeRegistry {
    /// The registry with the well-known preservation metadata schemas
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            MetadataKind::DublinCore,
            "dublin-core",
            "http://purl.org/dc/elements/1.1/",
        );
        registry.register(MetadataKind::Gbs, "gbs", "http://books.google.com/gbs");
        registry.register(
            MetadataKind::Fits,
            "fits",
            "http://hul.harvard.edu/ois/xml/ns/fits/fits_output",
        );
        registry.register(MetadataKind::AudioMd, "audiomd", "http://www.loc.gov/audioMD/");
        registry.register(
            MetadataKind::Marc21,
            "marc21",
            "http://www.loc.gov/MARC21/slim",
        );
        registry.register(MetadataKind::Mix, "mix", "http://www.loc.gov/mix/v20");
        registry.register(MetadataKind::VideoMd, "videomd", "http://www.loc.gov/videoMD/");
        registry.register(
            MetadataKind::PremisProvenance,
            "premis-provenance",
            "info:lc/xmlns/premis-v2",
        );
        registry.register(
            MetadataKind::PremisRights,
            "premis-rights",
            "info:lc/xmlns/premis-v2",
        );
        registry.register(MetadataKind::TextMd, "textmd", "info:lc/xmlns/textmd-v3");
        registry
    }
}
