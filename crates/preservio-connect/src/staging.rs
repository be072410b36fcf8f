//! Durable staging store
//!
//! Entities submitted for deferred ingest are written to uniquely named
//! staging files before any queue record is made, so a crash between
//! the two leaves at worst an orphaned staging file, never a queue
//! entry pointing at missing data.

use preservio_common::Result;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const STAGE_SUFFIX: &str = ".stage";

/// On-disk staging area for queued entities
#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
}

impl StagingStore {
    /// Open the staging area, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Durably write a uniquely named staging file and return its path
    ///
    /// The file is created with create-if-absent semantics and synced
    /// to disk before the path is returned.
    pub async fn stage(&self, raw: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}{STAGE_SUFFIX}", Uuid::new_v4()));
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(raw).await?;
        file.sync_all().await?;
        Ok(path)
    }

    /// Read a staged file back
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }

    /// Remove a staged file
    pub async fn remove(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    /// The staging directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
