//! services/api/src/adapters/file_store.rs
//!
//! Durable key-value storage backed by a single JSON file.
//! It implements the `KeyValueStore` port from the `core` crate.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quoteflow_core::ports::{KeyValueStore, PortError, PortResult};
use tokio::sync::Mutex;
use tracing::warn;

/// Keeps all entries in one JSON object on disk. Every `set` rewrites the file.
pub struct FileKeyValueStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw file, or `None` when it does not exist yet.
    async fn read_raw(&self) -> PortResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }

    fn parse(&self, raw: &str) -> PortResult<BTreeMap<String, String>> {
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(raw).map_err(|e| {
            PortError::Storage(format!("{} is not a storage file: {}", self.path.display(), e))
        })
    }

    async fn load(&self) -> PortResult<BTreeMap<String, String>> {
        match self.read_raw().await? {
            Some(raw) => self.parse(&raw),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Like `load`, but a file that does not parse yields an empty map, so the
    /// next write replaces it.
    async fn load_for_write(&self) -> PortResult<BTreeMap<String, String>> {
        let Some(raw) = self.read_raw().await? else {
            return Ok(BTreeMap::new());
        };
        match self.parse(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupted storage file.");
                Ok(BTreeMap::new())
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "storage.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_write().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Storage(e.to_string()))?;
        }
        let serialized = serde_json::to_string_pretty(&entries)
            .map_err(|e| PortError::Storage(e.to_string()))?;

        // Write beside the target, then swap it in.
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, serialized)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))
    }
}
