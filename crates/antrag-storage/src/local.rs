//! Local filesystem storage backend
//!
//! Stores blobs as files under a base directory and serves them under a
//! configured base URL. Used for development setups and as the real backend
//! in storage tests.

use std::path::{Path, PathBuf};

use antrag_core::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::keys::{apply_random_suffix, encode_key, key_from_url};
use crate::traits::{BlobStorage, PutOptions, PutResult, StorageError, StorageResult};

/// Local filesystem storage backend
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> StorageResult<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self {
            base_path,
            base_url: base_url.into(),
        })
    }

    /// Resolve a key to a path under the storage root, rejecting keys that
    /// would escape it.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key is empty".to_string()));
        }
        if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
            return Err(StorageError::InvalidKey(format!(
                "Key must not escape the storage root: {}",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), encode_key(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<PutResult> {
        let key = if options.add_random_suffix {
            apply_random_suffix(key)
        } else {
            key.to_string()
        };
        let path = self.key_to_path(&key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %key,
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File stored locally"
        );

        Ok(PutResult {
            url: self.generate_url(&key),
            key,
        })
    }

    async fn delete(&self, urls: &[String]) -> StorageResult<()> {
        if urls.is_empty() {
            return Ok(());
        }

        // Resolve every URL before touching the filesystem so a foreign URL
        // fails the call without a partial delete.
        let mut paths = Vec::with_capacity(urls.len());
        for url in urls {
            let key = key_from_url(&self.base_url, url)?;
            paths.push(self.key_to_path(&key)?);
        }

        for path in &paths {
            match fs::remove_file(path).await {
                Ok(()) => {}
                // Already gone counts as deleted
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StorageError::DeleteFailed(format!(
                        "Failed to delete {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        tracing::info!(count = urls.len(), "Local batch delete successful");

        Ok(())
    }

    async fn exists(&self, url: &str) -> StorageResult<bool> {
        let key = key_from_url(&self.base_url, url)?;
        let path = self.key_to_path(&key)?;
        fs::try_exists(&path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to check existence of {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
