//! Attachment upload orchestration
//!
//! `AttachmentService` drives one upload batch end to end: validate, store
//! sequentially in input order, and on a permanent failure delete whatever
//! was already stored before surfacing the error. Deletion of a batch is a
//! best-effort operation that reports its outcome instead of failing.

use std::sync::Arc;
use std::time::Instant;

use antrag_core::{
    AppError, AttachmentFile, BlobAccess, Config, DeletionOutcome, UploadLimits,
};
use antrag_storage::{BlobStorage, PutOptions};
use chrono::{DateTime, Utc};

use crate::keys::attachment_key;
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::validation::{self, FILES_FIELD};

const CACHE_MAX_AGE_SECS: u64 = 31_536_000;
const KEY_PREFIX: &str = "antraege";

/// Orchestrates attachment batches against a blob storage backend.
pub struct AttachmentService {
    storage: Arc<dyn BlobStorage>,
    limits: UploadLimits,
    retry: RetryConfig,
    access: BlobAccess,
    cache_control_max_age: u64,
    key_prefix: String,
}

impl AttachmentService {
    /// Create a service with the default retry policy, public access, and
    /// the standard key prefix.
    pub fn new(storage: Arc<dyn BlobStorage>, limits: UploadLimits) -> Self {
        Self {
            storage,
            limits,
            retry: RetryConfig::default(),
            access: BlobAccess::Public,
            cache_control_max_age: CACHE_MAX_AGE_SECS,
            key_prefix: KEY_PREFIX.to_string(),
        }
    }

    /// Build a service from configuration plus a storage backend.
    pub fn from_config(storage: Arc<dyn BlobStorage>, config: &Config) -> Self {
        Self {
            storage,
            limits: config.upload_limits(),
            retry: RetryConfig::new(
                config.upload_max_retries,
                std::time::Duration::from_millis(config.upload_retry_delay_ms),
            ),
            access: config.upload_access,
            cache_control_max_age: config.upload_cache_max_age_secs,
            key_prefix: config.upload_key_prefix.clone(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate a batch without performing any storage I/O.
    ///
    /// Violations surface as [`AppError::Validation`] keyed under the
    /// `files` field. An empty batch is valid.
    pub fn validate_files(&self, files: &[AttachmentFile]) -> Result<(), AppError> {
        let report = validation::validate_files(files, &self.limits);
        if !report.is_valid() {
            return Err(AppError::validation(FILES_FIELD, report.into_errors()));
        }

        // The combined batch size is checked independently of the per-file
        // routine.
        let total_size: usize = files.iter().map(|f| f.size()).sum();
        if total_size > self.limits.max_total_size_bytes {
            return Err(AppError::validation(
                FILES_FIELD,
                vec![format!(
                    "Attachments exceed the combined size limit of {} MB",
                    self.limits.max_total_size_bytes / 1024 / 1024
                )],
            ));
        }

        Ok(())
    }

    /// Upload a batch sequentially, in input order.
    ///
    /// `batch_uploaded_at` is shared by every derived key of the batch.
    /// On success the returned URLs correspond to `files` index for index.
    /// When one file fails permanently, every URL stored so far is submitted
    /// for deletion and the error names the failed file; files after it are
    /// never started.
    pub async fn upload_files(
        &self,
        files: &[AttachmentFile],
        batch_uploaded_at: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        self.validate_files(files)?;

        if files.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            count = files.len(),
            batch_millis = batch_uploaded_at.timestamp_millis(),
            "Uploading attachment batch"
        );

        let mut uploaded_urls: Vec<String> = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            match self.store_file(file, batch_uploaded_at, index).await {
                Ok(url) => uploaded_urls.push(url),
                Err(err) => {
                    let err = normalize_upload_error(err);
                    self.cleanup_after_failure(&uploaded_urls, &err).await;
                    return Err(err);
                }
            }
        }

        Ok(uploaded_urls)
    }

    /// Delete a batch of stored URLs.
    ///
    /// Never fails: the outcome reports whether every URL was removed. Each
    /// attempt submits the entire remaining set; re-deleting an already
    /// removed blob is a no-op at the backend.
    pub async fn delete_files(&self, urls: &[String]) -> DeletionOutcome {
        if urls.is_empty() {
            return DeletionOutcome::completed(Vec::new());
        }

        let start = Instant::now();
        let result =
            retry_with_backoff(&self.retry, "attachment delete", || self.storage.delete(urls))
                .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    count = urls.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Attachment batch deleted"
                );
                DeletionOutcome::completed(urls.to_vec())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    count = urls.len(),
                    attempts = self.retry.total_attempts(),
                    "Attachment batch delete failed after all attempts"
                );
                DeletionOutcome::failed()
            }
        }
    }

    async fn store_file(
        &self,
        file: &AttachmentFile,
        batch_uploaded_at: DateTime<Utc>,
        index: usize,
    ) -> Result<String, AppError> {
        let key = attachment_key(&self.key_prefix, batch_uploaded_at, index, &file.file_name);
        let options = PutOptions {
            access: self.access,
            content_type: Some(file.content_type.clone()),
            add_random_suffix: false,
            cache_control_max_age: Some(self.cache_control_max_age),
        };

        let start = Instant::now();
        let result = retry_with_backoff(&self.retry, "attachment upload", || {
            self.storage.put(&key, file.data.clone(), &options)
        })
        .await;

        match result {
            Ok(stored) => {
                tracing::info!(
                    key = %stored.key,
                    url = %stored.url,
                    size_bytes = file.size(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Attachment stored"
                );
                Ok(stored.url)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    key = %key,
                    file_name = %file.file_name,
                    attempts = self.retry.total_attempts(),
                    "Attachment upload failed after all attempts"
                );
                Err(AppError::FileUpload(format!(
                    "Failed to upload file \"{}\"",
                    file.file_name
                )))
            }
        }
    }

    /// Delete everything stored before a mid-batch failure. The original
    /// error stays the one the caller sees; a cleanup failure is only
    /// logged.
    async fn cleanup_after_failure(&self, uploaded_urls: &[String], original_error: &AppError) {
        if uploaded_urls.is_empty() {
            return;
        }

        tracing::warn!(
            count = uploaded_urls.len(),
            "Upload failed mid-batch, deleting already stored attachments"
        );

        let outcome = self.delete_files(uploaded_urls).await;
        if !outcome.success {
            tracing::error!(
                original_error = %original_error,
                requested = uploaded_urls.len(),
                "Failed to clean up stored attachments after upload failure"
            );
        }
    }
}

/// Validation and upload errors pass through unchanged; anything unexpected
/// becomes a generic upload error after its detail is logged.
fn normalize_upload_error(err: AppError) -> AppError {
    match err {
        AppError::Validation { .. } | AppError::FileUpload(_) => err,
        other => {
            tracing::error!(
                error = %other,
                detail = %other.detailed_message(),
                "Unexpected error during attachment upload"
            );
            AppError::FileUpload("File upload failed due to an unexpected error".to_string())
        }
    }
}
