//! Shared data types for the attachment pipeline.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One client-supplied file in an upload batch.
///
/// The payload is kept as `Bytes` so retries can re-send it without copying
/// the buffer.
#[derive(Debug, Clone)]
pub struct AttachmentFile {
    /// Original file name as submitted by the client.
    pub file_name: String,
    /// Declared media type, possibly with parameters (`text/plain; charset=utf-8`).
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

impl AttachmentFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Outcome of a batch deletion.
///
/// Deletion is all-or-nothing per batch: `deleted_urls` is either the full
/// requested set or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub success: bool,
    pub deleted_urls: Vec<String>,
}

impl DeletionOutcome {
    /// Every URL was removed.
    pub fn completed(deleted_urls: Vec<String>) -> Self {
        Self {
            success: true,
            deleted_urls,
        }
    }

    /// Nothing could be removed.
    pub fn failed() -> Self {
        Self {
            success: false,
            deleted_urls: Vec::new(),
        }
    }
}
