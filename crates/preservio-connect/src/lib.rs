//! Preservio connector core
//!
//! Maps hierarchical preservation records into and out of the graph
//! store, stages entities submitted for deferred ingest in a durable
//! on-disk queue, tracks entity lifecycle state, and drains the queue
//! on a periodic scheduler.

pub mod content;
pub mod lifecycle;
pub mod mapper;
pub mod queue;
pub mod scheduler;
pub mod staging;

pub use content::{ContentSource, UriContentSource};
pub use lifecycle::LifecycleTracker;
pub use mapper::EntityMapper;
pub use queue::{IngestQueue, QueueEntry};
pub use scheduler::{IngestScheduler, SchedulerHandle};
pub use staging::StagingStore;
