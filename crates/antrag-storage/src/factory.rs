//! Storage factory
//!
//! Builds the configured blob storage backend behind an `Arc<dyn BlobStorage>`.

use std::sync::Arc;

use antrag_core::{Config, StorageBackend};

use crate::traits::{BlobStorage, StorageError, StorageResult};

#[cfg(feature = "storage-local")]
use crate::local::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::s3::S3Storage;

/// Create a storage backend based on configuration
///
/// Defaults to S3 when `STORAGE_BACKEND` is unset.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn BlobStorage>> {
    let backend = config.storage_backend.unwrap_or(StorageBackend::S3);

    match backend {
        StorageBackend::S3 => {
            #[cfg(feature = "storage-s3")]
            {
                let bucket = config.s3_bucket.clone().ok_or_else(|| {
                    StorageError::ConfigError("S3_BUCKET not configured".to_string())
                })?;
                let region = config.s3_region.clone().or_else(|| config.aws_region.clone());
                let endpoint = config.s3_endpoint.clone();

                let storage = S3Storage::new(bucket, region, endpoint).await?;
                Ok(Arc::new(storage) as Arc<dyn BlobStorage>)
            }
            #[cfg(not(feature = "storage-s3"))]
            {
                Err(StorageError::ConfigError(
                    "S3 storage backend not enabled. Rebuild with the storage-s3 feature"
                        .to_string(),
                ))
            }
        }
        StorageBackend::Local => {
            #[cfg(feature = "storage-local")]
            {
                let base_path = config.local_storage_path.clone().ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
                let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

                let storage = LocalStorage::new(base_path, base_url)?;
                Ok(Arc::new(storage) as Arc<dyn BlobStorage>)
            }
            #[cfg(not(feature = "storage-local"))]
            {
                Err(StorageError::ConfigError(
                    "Local storage backend not enabled. Rebuild with the storage-local feature"
                        .to_string(),
                ))
            }
        }
    }
}
