//! Preservio graph layer
//!
//! Node paths, the fixed predicate vocabulary, typed relation/property
//! statements with the update-batch builder, the graph store
//! collaborator traits, and an in-memory transactional implementation.

pub mod memory;
pub mod path;
pub mod statement;
pub mod store;
pub mod vocab;

pub use memory::MemoryGraphStore;
pub use path::{NodePath, slot};
pub use statement::{ObjectValue, Statement, StatementOp, UpdateBatch, UpdateBuilder};
pub use store::{GraphSession, GraphStore, first_literal, literals, optional_literal, references};
