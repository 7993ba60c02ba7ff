//! Key and URL helpers shared by the storage backends.
//!
//! Public URLs embed the percent-encoded key after a backend-specific base;
//! these helpers keep the encode and decode sides in one place.

use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Percent-encode a key for use in a URL path, keeping `/` separators.
pub(crate) fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Recover the storage key from a public URL under the given base.
pub(crate) fn key_from_url(base: &str, url: &str) -> StorageResult<String> {
    let base = base.trim_end_matches('/');
    let rest = url
        .strip_prefix(base)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(|| StorageError::UnknownUrl(url.to_string()))?;

    if rest.is_empty() {
        return Err(StorageError::UnknownUrl(url.to_string()));
    }

    let segments = rest
        .split('/')
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .map_err(|_| StorageError::UnknownUrl(url.to_string()))
        })
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(segments.join("/"))
}

/// Insert a short random suffix before the file extension, or at the end
/// when the final segment has none.
pub(crate) fn apply_random_suffix(key: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    match key.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => format!("{}-{}.{}", stem, suffix, ext),
        _ => format!("{}-{}", key, suffix),
    }
}
