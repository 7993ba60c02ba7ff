//! Storage key derivation for attachment batches
//!
//! Every file of one upload call shares the batch timestamp, so sibling keys
//! stay distinct by index while remaining recognizable as one batch:
//! `{prefix}/{batch_millis}-{index}-{sanitized_name}`.

use chrono::{DateTime, Utc};

/// Replace whitespace in a file name so it is safe inside a storage key.
///
/// Only whitespace is rewritten; structural key safety (traversal, absolute
/// paths) is enforced by the storage backends.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Derive the storage key for one file of an upload batch.
pub fn attachment_key(
    prefix: &str,
    batch_uploaded_at: DateTime<Utc>,
    index: usize,
    file_name: &str,
) -> String {
    format!(
        "{}/{}-{}-{}",
        prefix.trim_end_matches('/'),
        batch_uploaded_at.timestamp_millis(),
        index,
        sanitize_file_name(file_name)
    )
}
