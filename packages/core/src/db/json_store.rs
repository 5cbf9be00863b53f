//! JSON File Store
//!
//! Persists the forest as one pretty-printed JSON array in `<data_dir>/<resource_key>`.
//! Writes go to a sibling temp file that is renamed over the target, so readers see
//! either the previous snapshot or the new one.

use super::{StoreError, TreeStore};
use crate::config::StoreConfig;
use crate::models::Node;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// File-backed snapshot store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    resource_key: String,
}

impl JsonFileStore {
    /// Store the snapshot as `resource_key` inside `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>, resource_key: impl Into<String>) -> Self {
        let resource_key = resource_key.into();
        Self {
            path: data_dir.into().join(&resource_key),
            resource_key,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.data_dir, &config.resource_key)
    }

    /// Full path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `bytes` to `temp_path`, flush it and rename it over the snapshot
    async fn replace_with(&self, temp_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = tokio::fs::File::create(temp_path)
            .await
            .map_err(|e| StoreError::io(temp_path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StoreError::io(temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io(temp_path, e))?;
        drop(file);

        tokio::fs::rename(temp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TreeStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Node>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No snapshot at {}, starting with an empty tree",
                    self.path.display()
                );
                self.store(&[]).await?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let forest: Vec<Node> = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            "Loaded {} top-level nodes from {}",
            forest.len(),
            self.path.display()
        );
        Ok(forest)
    }

    async fn store(&self, forest: &[Node]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let bytes = serde_json::to_vec_pretty(forest)?;
        let temp_path = self.temp_path();
        if let Err(e) = self.replace_with(&temp_path, &bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                tracing::debug!(
                    "Could not remove {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        tracing::debug!(
            "Stored {} top-level nodes to {}",
            forest.len(),
            self.path.display()
        );
        Ok(())
    }

    fn resource_key(&self) -> &str {
        &self.resource_key
    }
}
