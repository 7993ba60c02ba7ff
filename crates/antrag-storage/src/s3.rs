//! S3 storage backend
//!
//! Works against AWS S3 and S3-compatible services (MinIO, Hetzner, DO
//! Spaces) via a custom endpoint with path-style addressing. SDK-level
//! retries are disabled; the retry schedule belongs to the attachment
//! service so attempts are not multiplied across layers.

use antrag_core::{BlobAccess, StorageBackend};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectCannedAcl, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::keys::{apply_random_suffix, encode_key, key_from_url};
use crate::traits::{BlobStorage, PutOptions, PutResult, StorageError, StorageResult};

/// S3 storage backend
#[derive(Debug)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3Storage {
    /// Create a new S3 storage backend.
    ///
    /// `region` falls back to the default provider chain and then
    /// `us-east-1`; `endpoint` switches to path-style addressing for
    /// S3-compatible services.
    pub async fn new(
        bucket: impl Into<String>,
        region: Option<String>,
        endpoint: Option<String>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(StorageError::ConfigError(
                "S3 bucket name is empty".to_string(),
            ));
        }

        let region_provider = RegionProviderChain::first_try(region.map(Region::new))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let resolved_region = shared_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());

        let client = if let Some(endpoint_url) = &endpoint {
            let config = aws_sdk_s3::config::Builder::from(&shared_config)
                .endpoint_url(endpoint_url)
                .force_path_style(true)
                .build();
            Client::from_conf(config)
        } else {
            Client::new(&shared_config)
        };

        Ok(Self {
            client,
            bucket,
            region: resolved_region,
            endpoint,
        })
    }

    /// Base of every public URL this backend hands out.
    fn url_base(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
        } else {
            format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region)
        }
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.url_base(), encode_key(key))
    }

    fn key_for_url(&self, url: &str) -> StorageResult<String> {
        key_from_url(&self.url_base(), url)
    }
}

#[async_trait]
impl BlobStorage for S3Storage {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<PutResult> {
        let key = if options.add_random_suffix {
            apply_random_suffix(key)
        } else {
            key.to_string()
        };

        let size_bytes = data.len();
        let start = std::time::Instant::now();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data));

        if let Some(content_type) = &options.content_type {
            request = request.content_type(content_type);
        }
        if let Some(max_age) = options.cache_control_max_age {
            let cache_control = match options.access {
                BlobAccess::Public => format!("public, max-age={}", max_age),
                BlobAccess::Private => format!("private, max-age={}", max_age),
            };
            request = request.cache_control(cache_control);
        }
        if options.access == BlobAccess::Public {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 upload failed"
            );
            StorageError::UploadFailed(format!("Failed to upload {}: {}", key, e))
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
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

        // Resolve every URL first so a foreign URL fails the call before
        // any object is removed.
        let mut objects = Vec::with_capacity(urls.len());
        for url in urls {
            let key = self.key_for_url(url)?;
            let identifier = ObjectIdentifier::builder().key(key).build().map_err(|e| {
                StorageError::BackendError(format!("Invalid delete target {}: {}", url, e))
            })?;
            objects.push(identifier);
        }

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| {
                StorageError::BackendError(format!("Failed to build delete request: {}", e))
            })?;

        let start = std::time::Instant::now();

        let output = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    count = urls.len(),
                    "S3 batch delete failed"
                );
                StorageError::DeleteFailed(format!(
                    "Failed to delete {} objects: {}",
                    urls.len(),
                    e
                ))
            })?;

        // In quiet mode the response lists only the objects that failed
        let errors = output.errors();
        if !errors.is_empty() {
            let detail = errors
                .iter()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.key().unwrap_or("<unknown>"),
                        e.message().unwrap_or("unknown error")
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!(
                bucket = %self.bucket,
                failed = errors.len(),
                requested = urls.len(),
                "S3 batch delete reported per-object errors"
            );
            return Err(StorageError::DeleteFailed(detail));
        }

        tracing::info!(
            bucket = %self.bucket,
            count = urls.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 batch delete successful"
        );

        Ok(())
    }

    async fn exists(&self, url: &str) -> StorageResult<bool> {
        let key = self.key_for_url(url)?;

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err)) if service_err.err().is_not_found() => {
                Ok(false)
            }
            Err(e) => Err(StorageError::BackendError(format!(
                "Failed to check existence of {}: {}",
                key, e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
