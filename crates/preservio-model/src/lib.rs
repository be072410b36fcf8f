//! Preservio entity model
//!
//! The hierarchical preservation record (intellectual entity →
//! representations → files → bitstreams), lifecycle states, typed
//! metadata payloads with their classification registry, and the codec
//! boundary used to read and write metadata blobs.

pub mod codec;
pub mod entity;
pub mod identifier;
pub mod lifecycle;
pub mod metadata;

pub use codec::{JsonCodec, MetadataCodec};
pub use entity::{BitStream, BitStreamType, File, IntellectualEntity, Representation};
pub use identifier::{Identifier, IdentifierError};
pub use lifecycle::{LifecycleState, State};
pub use metadata::{Metadata, MetadataKind, TypeRegistry, TypeTag};
