//! Blob storage backends for antrag attachments
//!
//! Provides the `BlobStorage` trait plus an S3 backend (AWS and
//! S3-compatible endpoints) and a local filesystem backend, selected at
//! runtime through [`factory::create_storage`].
//!
//! Keys are slash-separated paths (`antraege/<millis>-<index>-<name>`);
//! public URLs embed the percent-encoded key after a backend-specific base.

pub mod factory;
#[cfg(any(feature = "storage-local", feature = "storage-s3"))]
pub(crate) mod keys;
pub mod traits;

#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;

pub use factory::create_storage;
pub use traits::{BlobStorage, PutOptions, PutResult, StorageError, StorageResult};

#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;

pub use antrag_core::{BlobAccess, StorageBackend};
