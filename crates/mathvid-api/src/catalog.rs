//! On-disk catalog of generated videos.
//!
//! The catalog is a pretty-printed JSON array of [`VideoRecord`]s, newest
//! first. A missing file reads as an empty catalog. Writes from this process
//! are serialised and land through a sibling temp file plus rename, so a
//! reader never sees a half-written document.

use std::path::{Path, PathBuf};

use mathvid_models::VideoRecord;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// JSON-file catalog store.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, newest first.
    pub async fn load(&self) -> CatalogResult<Vec<VideoRecord>> {
        read_records(&self.path).await
    }

    /// Insert `record` at the front of the catalog.
    pub async fn prepend(&self, record: VideoRecord) -> CatalogResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = read_records(&self.path).await?;
        records.insert(0, record);
        self.write_records(&records).await?;

        debug!(path = %self.path.display(), count = records.len(), "Catalog updated");
        Ok(())
    }

    async fn write_records(&self, records: &[VideoRecord]) -> CatalogResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        let staged = staging_path(&self.path);

        tokio::fs::write(&staged, json).await?;
        if let Err(e) = tokio::fs::rename(&staged, &self.path).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(e.into());
        }
        Ok(())
    }
}

async fn read_records(path: &Path) -> CatalogResult<Vec<VideoRecord>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&raw)?)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "catalog".into());
    name.push(".tmp");
    path.with_file_name(name)
}
