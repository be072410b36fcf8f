//! Preservio Connector Daemon
//!
//! Wires the entity mapper, ingest queue and scheduler together and
//! runs the deferred-ingest loop until interrupted. The graph store
//! behind it here is the in-memory implementation; a production
//! deployment swaps in an adapter for its repository backend.

use anyhow::Result;
use clap::Parser;
use preservio_common::Config;
use preservio_connect::{
    EntityMapper, IngestQueue, IngestScheduler, StagingStore, UriContentSource,
};
use preservio_graph::MemoryGraphStore;
use preservio_model::{JsonCodec, TypeRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "preservio-connectord")]
#[command(about = "Preservio connector daemon")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Staging directory for queued entities (overrides config)
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Scheduler period in milliseconds (overrides config)
    #[arg(long)]
    period_ms: Option<u64>,

    /// Scheduler initial delay in milliseconds (overrides config)
    #[arg(long)]
    initial_delay_ms: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.staging_dir {
        config.staging.dir = dir;
    }
    if let Some(period_ms) = args.period_ms {
        config.scheduler.period_ms = period_ms;
    }
    if let Some(initial_delay_ms) = args.initial_delay_ms {
        config.scheduler.initial_delay_ms = initial_delay_ms;
    }

    info!("Starting Preservio connector daemon");
    info!("Entity root: {}", config.store.entity_root);
    info!("Staging directory: {}", config.staging.dir.display());
    info!(
        "Scheduler: period {} ms, initial delay {} ms",
        config.scheduler.period_ms, config.scheduler.initial_delay_ms
    );

    let store = Arc::new(MemoryGraphStore::new());
    let staging = StagingStore::open(&config.staging.dir).await?;
    let queue = Arc::new(IngestQueue::new(
        store.clone(),
        staging,
        &config.store,
        config.scheduler.max_attempts,
    ));
    let mapper = Arc::new(EntityMapper::new(
        store.clone(),
        Arc::new(JsonCodec),
        Arc::new(UriContentSource::new()),
        TypeRegistry::default(),
        &config.store,
    ));
    let scheduler = Arc::new(IngestScheduler::new(queue, mapper, config.scheduler));
    let handle = scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.stop().await;

    Ok(())
}
