//! Sync adapters for the posted-games log.
//!
//! The dedup store calls `pull` before it reads the log and `push` after
//! every append. What "remote" means is up to the adapter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

/// Moves the local log to and from durable remote storage
#[async_trait]
pub trait LogSync: Send + Sync {
    fn name(&self) -> &str;

    /// Refresh the local copy at `local` before it is read
    async fn pull(&self, local: &Path) -> Result<()>;

    /// Publish the local copy at `local` after a write
    async fn push(&self, local: &Path) -> Result<()>;
}

/// Local file only
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSync;

#[async_trait]
impl LogSync for NoopSync {
    fn name(&self) -> &str {
        "none"
    }

    async fn pull(&self, _local: &Path) -> Result<()> {
        Ok(())
    }

    async fn push(&self, _local: &Path) -> Result<()> {
        Ok(())
    }
}

/// Mirrors the log to another path, e.g. a mounted bucket or shared volume
#[derive(Debug, Clone)]
pub struct MirrorSync {
    mirror: PathBuf,
}

impl MirrorSync {
    pub fn new(mirror: impl Into<PathBuf>) -> Self {
        Self {
            mirror: mirror.into(),
        }
    }
}

async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::copy(from, to)
        .await
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;

    Ok(())
}

#[async_trait]
impl LogSync for MirrorSync {
    fn name(&self) -> &str {
        "mirror"
    }

    async fn pull(&self, local: &Path) -> Result<()> {
        // Only NotFound means first run
        let exists = fs::try_exists(&self.mirror)
            .await
            .with_context(|| format!("Failed to stat mirrored log: {}", self.mirror.display()))?;
        if !exists {
            debug!(mirror = %self.mirror.display(), "No mirrored log yet");
            return Ok(());
        }

        copy_file(&self.mirror, local).await
    }

    async fn push(&self, local: &Path) -> Result<()> {
        copy_file(local, &self.mirror).await
    }
}
