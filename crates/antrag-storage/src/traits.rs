//! Blob storage abstraction
//!
//! The `BlobStorage` trait is the seam between the attachment orchestration
//! and the place bytes actually live. Uploads are addressed by key; every
//! other operation is addressed by the public URL a `put` returned, because
//! URLs are what the application persists and hands back later.

use antrag_core::{BlobAccess, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("URL does not belong to this storage backend: {0}")]
    UnknownUrl(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Options applied to a single `put`.
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// Access level of the stored blob.
    pub access: BlobAccess,
    /// Content type served with the blob.
    pub content_type: Option<String>,
    /// Append a random suffix to the key before storing. Callers that derive
    /// collision-free keys themselves pass `false`.
    pub add_random_suffix: bool,
    /// Cache lifetime in seconds for the served blob.
    pub cache_control_max_age: Option<u64>,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            access: BlobAccess::Public,
            content_type: None,
            add_random_suffix: false,
            cache_control_max_age: None,
        }
    }
}

/// Result of storing one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResult {
    /// Effective key; differs from the requested key when a random suffix
    /// was applied.
    pub key: String,
    /// Public URL of the stored blob.
    pub url: String,
}

/// Storage backend abstraction for blobs
///
/// Implementations must be thread-safe as they will be shared across
/// async tasks.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store a blob under `key` and return its effective key and public URL.
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<PutResult>;

    /// Delete every URL in one backend call.
    ///
    /// Atomic per call: if any member fails, the whole call fails and the
    /// caller may resubmit the full set. A URL whose blob is already gone
    /// counts as deleted.
    async fn delete(&self, urls: &[String]) -> StorageResult<()>;

    /// Check whether a stored URL still resolves to a blob.
    async fn exists(&self, url: &str) -> StorageResult<bool>;

    /// The storage backend type
    fn backend_type(&self) -> StorageBackend;
}
