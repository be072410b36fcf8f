//! Ingest scheduler
//!
//! Drains the ingest queue through the entity mapper on a fixed period
//! after an initial delay. Ticks never overlap; tests drive `tick`
//! directly instead of waiting on wall-clock timers.

use crate::mapper::EntityMapper;
use crate::queue::{IngestQueue, QueueEntry};
use preservio_common::config::SchedulerConfig;
use preservio_common::{Error, Result};
use preservio_model::IntellectualEntity;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Periodic worker promoting queued entities into stored ones
pub struct IngestScheduler {
    queue: Arc<IngestQueue>,
    mapper: Arc<EntityMapper>,
    config: SchedulerConfig,
    tick_lock: tokio::sync::Mutex<()>,
}

impl IngestScheduler {
    pub fn new(queue: Arc<IngestQueue>, mapper: Arc<EntityMapper>, config: SchedulerConfig) -> Self {
        Self {
            queue,
            mapper,
            config,
            tick_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Drain the current queue snapshot once; returns how many entities
    /// were ingested
    ///
    /// A failing item stays queued for a later tick (bounded by the
    /// configured attempt limit). Opaque store failures are not counted
    /// as an attempt; they abort the tick and propagate.
    pub async fn tick(&self) -> Result<usize> {
        let _exclusive = self.tick_lock.lock().await;

        let entries = self.queue.list().await?;
        let mut ingested = 0;
        for entry in entries {
            match self.ingest_entry(&entry).await {
                Ok(()) => ingested += 1,
                Err(e @ Error::Store(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        "deferred ingest of '{}' failed (attempt {}): {e}",
                        entry.id,
                        entry.attempts + 1
                    );
                    self.queue.record_failure(&entry).await?;
                }
            }
        }
        Ok(ingested)
    }

    async fn ingest_entry(&self, entry: &QueueEntry) -> Result<()> {
        let raw = self.queue.read_staged(entry).await?;
        let entity: IntellectualEntity = serde_json::from_slice(&raw)?;
        self.mapper
            .store_entity(&entity, Some(entry.id.clone()))
            .await?;
        self.queue.dequeue(entry).await
    }

    /// Spawn the periodic drain task
    ///
    /// The task sleeps for the configured initial delay, then ticks on
    /// the configured period until the returned handle is stopped.
    #[must_use]
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let scheduler = self;
        let initial_delay = Duration::from_millis(scheduler.config.initial_delay_ms);
        let period = Duration::from_millis(scheduler.config.period_ms);

        let task = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(initial_delay) => {}
                _ = shutdown_rx.changed() => return,
            }
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match scheduler.tick().await {
                            Ok(0) => {}
                            Ok(count) => info!("ingested {count} queued entities"),
                            Err(e) => error!("ingest tick failed: {e}"),
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running scheduler task
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for the task to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
