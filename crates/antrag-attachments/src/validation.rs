//! Attachment batch validation
//!
//! Pure checks, no I/O. `validate_files` covers the per-batch count limit
//! and the per-file size and media-type limits; the aggregate batch size is
//! a service-level check layered on top.

use antrag_core::{AttachmentFile, UploadLimits};

/// Form field every attachment message is keyed under.
pub const FILES_FIELD: &str = "files";

/// Accumulated validation messages for one batch.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Validate a batch against the count, per-file size, and media-type limits.
///
/// All violations are accumulated; an empty batch is valid.
pub fn validate_files(files: &[AttachmentFile], limits: &UploadLimits) -> ValidationReport {
    let mut errors = Vec::new();

    if files.len() > limits.max_file_count {
        errors.push(format!(
            "Too many attachments: {} (maximum {})",
            files.len(),
            limits.max_file_count
        ));
    }

    for file in files {
        if file.size() > limits.max_file_size_bytes {
            errors.push(format!(
                "File \"{}\" exceeds the maximum size of {} MB",
                file.file_name,
                limits.max_file_size_bytes / 1024 / 1024
            ));
        }

        if !is_allowed_content_type(&file.content_type, &limits.allowed_content_types) {
            errors.push(format!(
                "File \"{}\" has an unsupported type \"{}\". Allowed types: {}",
                file.file_name,
                file.content_type,
                limits.allowed_content_types.join(", ")
            ));
        }
    }

    ValidationReport { errors }
}

/// Strip parameters from a MIME type (e.g. "text/plain; charset=utf-8" -> "text/plain")
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

fn is_allowed_content_type(content_type: &str, allowed: &[String]) -> bool {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    allowed.iter().any(|ct| normalized == ct.to_lowercase())
}
