//! File-backed store shared by processes on one host
//!
//! One file per key under a directory. Writes land in a temporary file in
//! the same directory and are renamed into place, so readers never see a
//! partial value. Read-modify-write on the counter holds an exclusive lock
//! on a sidecar lock file.

use super::{decode_i64, decode_state, HealthStore, HEALTH_STATE_KEY, MATCHED_COUNT_KEY};
use crate::domain::{Dimension, HealthState};
use crate::error::StoreError;
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOCK_FILE: &str = ".lock";

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    /// Open a store rooted at `path`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        log::debug!("Opened file store at {}", root.display());
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Directory holding the store files
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_key(&self, key: &'static str) -> Result<Option<String>, StoreError> {
        let root = Arc::clone(&self.root);
        run_blocking(move || read_value(&root, key)).await
    }

    async fn write_key(&self, key: &'static str, value: String) -> Result<(), StoreError> {
        let root = Arc::clone(&self.root);
        run_blocking(move || write_value(&root, key, &value)).await
    }
}

#[async_trait]
impl HealthStore for FileStore {
    async fn matched_count(&self) -> Result<i64, StoreError> {
        match self.read_key(MATCHED_COUNT_KEY).await? {
            Some(raw) => decode_i64(MATCHED_COUNT_KEY, &raw),
            None => Ok(0),
        }
    }

    async fn add_matched(&self, count: i64) -> Result<i64, StoreError> {
        let root = Arc::clone(&self.root);
        run_blocking(move || {
            let lock = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(root.join(LOCK_FILE))?;
            lock.lock_exclusive()?;

            let result = read_value(&root, MATCHED_COUNT_KEY).and_then(|raw| {
                let current = match raw {
                    Some(raw) => decode_i64(MATCHED_COUNT_KEY, &raw)?,
                    None => 0,
                };
                let total = current.saturating_add(count);
                write_value(&root, MATCHED_COUNT_KEY, &total.to_string())?;
                Ok(total)
            });

            if let Err(e) = FileExt::unlock(&lock) {
                log::warn!("Failed to release store lock: {}", e);
            }
            result
        })
        .await
    }

    async fn last_activity(&self, dimension: Dimension) -> Result<Option<i64>, StoreError> {
        self.read_key(dimension.key())
            .await?
            .map(|raw| decode_i64(dimension.key(), &raw))
            .transpose()
    }

    async fn record_activity(
        &self,
        dimension: Dimension,
        timestamp: i64,
    ) -> Result<(), StoreError> {
        self.write_key(dimension.key(), timestamp.to_string()).await
    }

    async fn health_state(&self) -> Result<HealthState, StoreError> {
        match self.read_key(HEALTH_STATE_KEY).await? {
            Some(raw) => decode_state(&raw),
            None => Ok(HealthState::default()),
        }
    }

    async fn set_health_state(&self, state: HealthState) -> Result<(), StoreError> {
        self.write_key(HEALTH_STATE_KEY, state.as_str().to_string())
            .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Unavailable(format!("store worker failed: {}", e)))?
}

fn read_value(root: &Path, key: &str) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(root.join(key)) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_value(root: &Path, key: &str, value: &str) -> Result<(), StoreError> {
    let mut tmp = tempfile::NamedTempFile::new_in(root)?;
    tmp.write_all(value.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(root.join(key)).map_err(|e| e.error)?;
    Ok(())
}
