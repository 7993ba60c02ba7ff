//! Attachment upload orchestration for antrag submissions
//!
//! The embedding application hands a batch of files to
//! [`AttachmentService::upload_files`] and gets back the public URLs in
//! input order, or an error after everything already stored was cleaned up
//! again. Validation and batch deletion are exposed on the same service.

pub mod keys;
pub mod retry;
pub mod service;
pub mod validation;

pub use keys::{attachment_key, sanitize_file_name};
pub use retry::RetryConfig;
pub use service::AttachmentService;
pub use validation::{validate_files, ValidationReport, FILES_FIELD};
