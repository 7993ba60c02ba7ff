//! Core types for the antrag attachment pipeline
//!
//! This crate holds the pieces shared by every other crate in the workspace:
//! configuration, the unified error type, the attachment data model, and the
//! storage backend enums.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

pub use config::{Config, UploadLimits};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AttachmentFile, DeletionOutcome};
pub use storage_types::{BlobAccess, StorageBackend};
