//! Append-only log of announced events.
//!
//! One line per delivered announcement (see `PostedRecord`). The whole log
//! is loaded into memory when the store opens; appends go straight to disk
//! and are then pushed through the sync adapter.
//!
//! Read-then-append is not safe across concurrent runs. Callers must
//! serialize invocations.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::adapters::{LogSync, NoopSync};
use crate::domain::PostedRecord;

/// Storage failures. Always fatal to a run.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("failed to read posted log {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write posted log {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("posted log sync ({adapter}) failed: {message}")]
    Sync { adapter: String, message: String },
}

/// File-backed set of notified event ids
pub struct DedupStore {
    /// Backing file; `None` once detached
    path: Option<PathBuf>,

    sync: Box<dyn LogSync>,

    /// Records in file order
    records: Vec<PostedRecord>,

    ids: HashSet<String>,
}

impl DedupStore {
    /// Open the log at `path` with no remote sync
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DedupError> {
        Self::open_with_sync(path, Box::new(NoopSync)).await
    }

    /// Pull through `sync`, then load the full log at `path`.
    ///
    /// A missing file is an empty log.
    pub async fn open_with_sync(
        path: impl Into<PathBuf>,
        sync: Box<dyn LogSync>,
    ) -> Result<Self, DedupError> {
        let path = path.into();

        sync.pull(&path).await.map_err(|e| DedupError::Sync {
            adapter: sync.name().to_string(),
            message: format!("{:#}", e),
        })?;

        let records = load_records(&path).await?;
        let ids = records.iter().map(|r| r.event_id.clone()).collect();

        debug!(path = %path.display(), count = records.len(), "Loaded posted log");

        Ok(Self {
            path: Some(path),
            sync,
            records,
            ids,
        })
    }

    /// Stop persisting: later marks live only in memory
    pub fn detach(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Was an announcement for `event_id` ever delivered?
    pub fn was_notified(&self, event_id: &str) -> bool {
        self.ids.contains(event_id)
    }

    /// Append `event_id` to the log.
    ///
    /// Repeated marks append repeated lines; the orchestrator avoids them.
    pub async fn mark_notified(&mut self, event_id: &str) -> Result<(), DedupError> {
        let record = PostedRecord::now(event_id);

        if let Some(path) = &self.path {
            append_record(path, &record).await?;

            self.sync.push(path).await.map_err(|e| DedupError::Sync {
                adapter: self.sync.name().to_string(),
                message: format!("{:#}", e),
            })?;

            info!(%event_id, path = %path.display(), "Saved posted event");
        } else {
            info!(%event_id, "Marked posted (detached, not persisted)");
        }

        self.ids.insert(record.event_id.clone());
        self.records.push(record);
        Ok(())
    }

    /// All records, oldest first
    pub fn records(&self) -> &[PostedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

async fn load_records(path: &Path) -> Result<Vec<PostedRecord>, DedupError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(DedupError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(content.lines().filter_map(PostedRecord::parse_line).collect())
}

async fn append_record(path: &Path, record: &PostedRecord) -> Result<(), DedupError> {
    let write_err = |source| DedupError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(write_err)?;

    file.write_all(format!("{}\n", record.to_line()).as_bytes())
        .await
        .map_err(write_err)?;
    file.flush().await.map_err(write_err)?;

    Ok(())
}
