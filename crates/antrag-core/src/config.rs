//! Application configuration
//!
//! Loaded from environment variables (with `.env` support via dotenvy).
//! Every limit has a compiled-in default so a bare environment still yields
//! a usable development configuration; `validate()` catches combinations
//! that cannot work.

use std::env;
use std::str::FromStr;

use crate::storage_types::{BlobAccess, StorageBackend};

const MAX_FILE_COUNT: usize = 5;
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_TOTAL_UPLOAD_SIZE_MB: usize = 25;
const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "application/pdf,image/jpeg,image/png";
const UPLOAD_KEY_PREFIX: &str = "antraege";
const UPLOAD_CACHE_MAX_AGE_SECS: u64 = 31_536_000;
const UPLOAD_MAX_RETRIES: u32 = 3;
const UPLOAD_RETRY_DELAY_MS: u64 = 1000;

/// Limits applied to one upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_count: usize,
    pub max_file_size_bytes: usize,
    pub max_total_size_bytes: usize,
    /// Allow-listed media types, lowercase, without parameters.
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_count: MAX_FILE_COUNT,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_total_size_bytes: MAX_TOTAL_UPLOAD_SIZE_MB * 1024 * 1024,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,

    // Storage backend configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,

    // Upload limits
    pub max_file_count: usize,
    pub max_file_size_bytes: usize,
    pub max_total_upload_size_bytes: usize,
    pub allowed_content_types: Vec<String>,

    // Upload behavior
    pub upload_key_prefix: String,
    pub upload_access: BlobAccess,
    pub upload_cache_max_age_secs: u64,
    pub upload_max_retries: u32,
    pub upload_retry_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| StorageBackend::from_str(&s).ok());

        let max_file_count = env::var("MAX_FILE_COUNT")
            .unwrap_or_else(|_| MAX_FILE_COUNT.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_COUNT);

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_total_upload_size_mb = env::var("MAX_TOTAL_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_TOTAL_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_TOTAL_UPLOAD_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            environment,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_file_count,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_total_upload_size_bytes: max_total_upload_size_mb * 1024 * 1024,
            allowed_content_types,
            upload_key_prefix: env::var("UPLOAD_KEY_PREFIX")
                .unwrap_or_else(|_| UPLOAD_KEY_PREFIX.to_string()),
            upload_access: env::var("UPLOAD_ACCESS")
                .ok()
                .and_then(|s| BlobAccess::from_str(&s).ok())
                .unwrap_or(BlobAccess::Public),
            upload_cache_max_age_secs: env::var("UPLOAD_CACHE_MAX_AGE_SECS")
                .unwrap_or_else(|_| UPLOAD_CACHE_MAX_AGE_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_CACHE_MAX_AGE_SECS),
            upload_max_retries: env::var("UPLOAD_MAX_RETRIES")
                .unwrap_or_else(|_| UPLOAD_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(UPLOAD_MAX_RETRIES),
            upload_retry_delay_ms: env::var("UPLOAD_RETRY_DELAY_MS")
                .unwrap_or_else(|_| UPLOAD_RETRY_DELAY_MS.to_string())
                .parse()
                .unwrap_or(UPLOAD_RETRY_DELAY_MS),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_count == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_COUNT must be at least 1"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be at least 1"));
        }

        if self.max_file_size_bytes > self.max_total_upload_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB ({}) cannot exceed MAX_TOTAL_UPLOAD_SIZE_MB ({})",
                self.max_file_size_bytes / 1024 / 1024,
                self.max_total_upload_size_bytes / 1024 / 1024
            ));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one media type"
            ));
        }

        match self.storage_backend.unwrap_or(StorageBackend::S3) {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when STORAGE_BACKEND is s3"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when STORAGE_BACKEND is s3"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND is local"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when STORAGE_BACKEND is local"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Batch limits as consumed by validation.
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_count: self.max_file_count,
            max_file_size_bytes: self.max_file_size_bytes,
            max_total_size_bytes: self.max_total_upload_size_bytes,
            allowed_content_types: self.allowed_content_types.clone(),
        }
    }
}
