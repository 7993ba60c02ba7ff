//! Test helpers: scriptable recording storage backend and batch fixtures.
//!
//! Run from workspace root: `cargo test -p antrag-attachments --test attachments_test`
//! or `cargo test -p antrag-attachments`.

pub mod storage;

use antrag_core::{AttachmentFile, UploadLimits};
use chrono::{DateTime, TimeZone, Utc};

/// Limits small enough to violate comfortably in tests.
pub fn test_limits() -> UploadLimits {
    UploadLimits {
        max_file_count: 5,
        max_file_size_bytes: 1024 * 1024,
        max_total_size_bytes: 2 * 1024 * 1024,
        allowed_content_types: vec![
            "application/pdf".to_string(),
            "image/jpeg".to_string(),
            "image/png".to_string(),
        ],
    }
}

/// Fixed batch timestamp so derived keys are predictable.
pub fn batch_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 10, 30, 0).unwrap()
}

pub fn pdf_file(name: &str, size: usize) -> AttachmentFile {
    AttachmentFile::new(name, "application/pdf", vec![0u8; size])
}
