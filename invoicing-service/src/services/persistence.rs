//! Persistence port for the domain snapshot.
//!
//! The whole snapshot is one opaque blob under a fixed key; every save
//! overwrites it.

use async_trait::async_trait;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::sync::Mutex;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the stored blob, `None` when nothing was saved yet.
    async fn load(&self) -> Result<Option<String>, AppError>;
    /// Replace the stored blob.
    async fn save(&self, blob: &str) -> Result<(), AppError>;
}

/// One JSON file per key inside a directory.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub async fn new(base_path: impl Into<PathBuf>, key: &str) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            path: base_path.join(format!("{}.json", key)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        match fs::read_to_string(&self.path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(anyhow::anyhow!(
                "Failed to read snapshot {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, blob: &str) -> Result<(), AppError> {
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, blob).await.map_err(|e| {
            AppError::StorageError(anyhow::anyhow!(
                "Failed to write snapshot {}: {}",
                staging.display(),
                e
            ))
        })?;
        fs::rename(&staging, &self.path).await.map_err(|e| {
            AppError::StorageError(anyhow::anyhow!(
                "Failed to replace snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}

/// In-process store, used by tests and embedders.
#[derive(Default)]
pub struct MemorySnapshotStore {
    blob: Mutex<Option<String>>,
    fail_saves: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub async fn contents(&self) -> Option<String> {
        self.blob.lock().await.clone()
    }

    /// Make subsequent saves fail, to exercise storage outages.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.blob.lock().await.clone())
    }

    async fn save(&self, blob: &str) -> Result<(), AppError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::StorageError(anyhow::anyhow!(
                "Snapshot storage unavailable"
            )));
        }
        *self.blob.lock().await = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested"), "app-data")
            .await
            .unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        store.save(r#"{"a":1}"#).await.unwrap();
        store.save(r#"{"a":2}"#).await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some(r#"{"a":2}"#));
        assert!(store.path().ends_with("app-data.json"));
    }

    #[tokio::test]
    async fn memory_store_can_simulate_outage() {
        let store = MemorySnapshotStore::new();
        store.set_fail_saves(true);
        assert!(matches!(
            store.save("{}").await,
            Err(AppError::StorageError(_))
        ));
        assert_eq!(store.contents().await, None);
    }
}
