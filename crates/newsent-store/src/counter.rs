//! Request counter persisted as `{"count": <n>}`.
//!
//! The value is loaded lazily on first access and afterwards lives in memory
//! behind a single async mutex. Each increment updates memory and rewrites
//! the file inside the same critical section, so concurrent callers can never
//! lose an update. The blocking task that writes the file owns the lock guard,
//! so dropping an `increment` future cannot release the lock before the write
//! has finished. Writes go to a temp file in the target directory that is
//! then renamed over the old one.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("failed to read counter file {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("counter file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-fatal for [`RequestCounter::increment`], which logs it and keeps
    /// the in-memory value.
    #[error("failed to persist counter to {path}: {source}")]
    PersistenceWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("counter I/O task failed: {0}")]
    Task(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CounterFile {
    /// `null` and an absent field both read as zero.
    #[serde(default)]
    count: Option<u64>,
}

/// Process-wide request counter. Share it behind an `Arc`.
#[derive(Debug)]
pub struct RequestCounter {
    path: PathBuf,
    /// `None` until the persisted value has been read.
    value: Arc<Mutex<Option<u64>>>,
}

impl RequestCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            value: Arc::new(Mutex::new(None)),
        }
    }

    /// Current count, loading it from disk on first access.
    ///
    /// # Errors
    ///
    /// Returns [`CounterError::Load`] or [`CounterError::Corrupt`] if the
    /// counter file exists but cannot be read. The load is retried on the
    /// next call.
    pub async fn current(&self) -> Result<u64, CounterError> {
        let mut value = self.value.lock().await;
        self.ensure_loaded(&mut value).await
    }

    /// Add one and persist the new value, returning it.
    ///
    /// A failed write is logged and otherwise ignored: the in-memory count
    /// still advances for the life of the process.
    ///
    /// # Errors
    ///
    /// Returns initial-load failures (see [`RequestCounter::current`]) and
    /// [`CounterError::Task`] if the write task panics.
    pub async fn increment(&self) -> Result<u64, CounterError> {
        let mut value = Arc::clone(&self.value).lock_owned().await;
        let current = self.ensure_loaded(&mut value).await?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let next = current.saturating_add(1);
            *value = Some(next);
            if let Err(e) = persist_count(&path, next) {
                tracing::warn!(count = next, error = %e, "request counter not persisted");
            }
            next
        })
        .await
        .map_err(|e| CounterError::Task(e.to_string()))
    }

    async fn ensure_loaded(&self, value: &mut Option<u64>) -> Result<u64, CounterError> {
        if let Some(current) = *value {
            return Ok(current);
        }

        let path = self.path.clone();
        let loaded = tokio::task::spawn_blocking(move || read_persisted_count(&path))
            .await
            .map_err(|e| CounterError::Task(e.to_string()))??;

        tracing::info!(path = %self.path.display(), count = loaded, "request counter loaded");
        *value = Some(loaded);
        Ok(loaded)
    }
}

/// Read the persisted count, treating a missing file as zero.
///
/// # Errors
///
/// Returns [`CounterError::Load`] for I/O failures other than not-found and
/// [`CounterError::Corrupt`] if the contents are not a counter object.
pub fn read_persisted_count(path: &Path) -> Result<u64, CounterError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(CounterError::Load {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let file: CounterFile = serde_json::from_str(&raw).map_err(|e| CounterError::Corrupt {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(file.count.unwrap_or(0))
}

fn persist_count(path: &Path, count: u64) -> Result<(), CounterError> {
    write_replacing(path, count).map_err(|e| CounterError::PersistenceWrite {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write to a sibling temp file, fsync, then rename over `path`.
fn write_replacing(path: &Path, count: u64) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let body = serde_json::to_vec(&CounterFile { count: Some(count) })
        .map_err(std::io::Error::other)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
