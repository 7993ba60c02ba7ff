//! Attachment orchestration integration tests.
//!
//! Run from workspace root: `cargo test -p antrag-attachments --test attachments_test`.
//! Retry timing runs under a paused tokio clock, so the full backoff
//! schedule is asserted without real waiting.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use antrag_attachments::{AttachmentService, RetryConfig};
use antrag_core::{AppError, AttachmentFile, BlobAccess, Config, StorageBackend};
use helpers::storage::{RecordingStorage, ALWAYS};
use helpers::{batch_time, pdf_file, test_limits};

fn test_service(storage: &RecordingStorage) -> AttachmentService {
    AttachmentService::new(Arc::new(storage.clone()), test_limits())
}

#[tokio::test]
async fn test_upload_returns_urls_in_input_order() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let files = vec![
        pdf_file("Mietvertrag Seite 1.pdf", 64),
        pdf_file("Einkommensnachweis.pdf", 32),
    ];

    let urls = service.upload_files(&files, batch_time()).await.unwrap();

    assert_eq!(
        urls,
        vec![
            RecordingStorage::url_for_key("antraege/1715941800000-0-Mietvertrag_Seite_1.pdf"),
            RecordingStorage::url_for_key("antraege/1715941800000-1-Einkommensnachweis.pdf"),
        ]
    );

    let puts = storage.puts();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].key, "antraege/1715941800000-0-Mietvertrag_Seite_1.pdf");
    assert_eq!(puts[1].key, "antraege/1715941800000-1-Einkommensnachweis.pdf");
    assert!(storage.delete_calls().is_empty());
}

#[tokio::test]
async fn test_upload_empty_batch_performs_no_storage_calls() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let urls = service.upload_files(&[], batch_time()).await.unwrap();

    assert!(urls.is_empty());
    assert!(storage.puts().is_empty());
    assert!(storage.delete_calls().is_empty());
}

#[tokio::test]
async fn test_validation_failure_prevents_storage_calls() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let files = vec![pdf_file("riesig.pdf", 2 * 1024 * 1024)];
    let err = service.upload_files(&files, batch_time()).await.unwrap_err();

    let errors = err.validation_errors().expect("expected a validation error");
    assert!(errors["files"][0].contains("riesig.pdf"));
    assert!(storage.puts().is_empty());
    assert!(storage.delete_calls().is_empty());
}

#[tokio::test]
async fn test_aggregate_size_violation_rejected_before_upload() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    // Each file is within the 1 MB per-file limit; together they exceed the
    // 2 MB batch limit.
    let files = vec![
        pdf_file("a.pdf", 900 * 1024),
        pdf_file("b.pdf", 900 * 1024),
        pdf_file("c.pdf", 900 * 1024),
    ];

    let err = service.upload_files(&files, batch_time()).await.unwrap_err();

    let errors = err.validation_errors().expect("expected a validation error");
    assert_eq!(errors["files"].len(), 1);
    assert!(errors["files"][0].contains("combined size limit"));
    assert!(storage.puts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_file_rolls_back_earlier_uploads() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    storage.fail_puts_matching("zwei", ALWAYS);

    let files = vec![
        pdf_file("eins.pdf", 16),
        pdf_file("zwei.pdf", 16),
        pdf_file("drei.pdf", 16),
    ];

    let err = service.upload_files(&files, batch_time()).await.unwrap_err();

    match err {
        AppError::FileUpload(msg) => assert_eq!(msg, "Failed to upload file \"zwei.pdf\""),
        other => panic!("unexpected error: {:?}", other),
    }

    // One successful put for the first file, four attempts for the second,
    // and the third never starts.
    let puts = storage.puts();
    assert_eq!(puts.len(), 5);
    assert_eq!(puts[0].key, "antraege/1715941800000-0-eins.pdf");
    for attempt in &puts[1..] {
        assert_eq!(attempt.key, "antraege/1715941800000-1-zwei.pdf");
    }

    // Exactly one compensation call, covering exactly the first file's URL
    let expected_url = RecordingStorage::url_for_key("antraege/1715941800000-0-eins.pdf");
    assert_eq!(storage.delete_calls(), vec![vec![expected_url]]);
    assert!(storage.live_urls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_permanently_failing_upload_retries_with_backoff() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    storage.fail_puts_matching("bericht", ALWAYS);

    let files = vec![pdf_file("bericht.pdf", 16)];
    let err = service.upload_files(&files, batch_time()).await.unwrap_err();

    assert!(matches!(err, AppError::FileUpload(_)));

    let puts = storage.puts();
    assert_eq!(puts.len(), 4);
    assert_eq!(
        puts[1].at.duration_since(puts[0].at),
        Duration::from_millis(1000)
    );
    assert_eq!(
        puts[2].at.duration_since(puts[1].at),
        Duration::from_millis(2000)
    );
    assert_eq!(
        puts[3].at.duration_since(puts[2].at),
        Duration::from_millis(4000)
    );
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_recover_within_budget() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    storage.fail_puts_matching("bericht", 2);

    let files = vec![pdf_file("bericht.pdf", 16)];
    let urls = service.upload_files(&files, batch_time()).await.unwrap();

    assert_eq!(
        urls,
        vec![RecordingStorage::url_for_key(
            "antraege/1715941800000-0-bericht.pdf"
        )]
    );
    assert_eq!(storage.puts().len(), 3);
    assert!(storage.delete_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_retries_whole_set_until_success() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let files = vec![
        pdf_file("eins.pdf", 16),
        pdf_file("zwei.pdf", 16),
        pdf_file("drei.pdf", 16),
    ];
    let urls = service.upload_files(&files, batch_time()).await.unwrap();

    storage.fail_deletes(1);
    let outcome = service.delete_files(&urls).await;

    assert!(outcome.success);
    assert_eq!(outcome.deleted_urls, urls);

    // The failed attempt and the successful one both received the full set
    let calls = storage.delete_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], urls);
    assert_eq!(calls[1], urls);
    assert!(storage.live_urls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_exhaustion_reports_failure_without_raising() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let files = vec![pdf_file("eins.pdf", 16), pdf_file("zwei.pdf", 16)];
    let urls = service.upload_files(&files, batch_time()).await.unwrap();

    storage.fail_deletes(ALWAYS);
    let outcome = service.delete_files(&urls).await;

    assert!(!outcome.success);
    assert!(outcome.deleted_urls.is_empty());
    assert_eq!(storage.delete_calls().len(), 4);
    assert_eq!(storage.live_urls().len(), 2);
}

#[tokio::test]
async fn test_delete_empty_batch_is_immediate() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let outcome = service.delete_files(&[]).await;

    assert!(outcome.success);
    assert!(outcome.deleted_urls.is_empty());
    assert!(storage.delete_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_failure_keeps_original_error() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    storage.fail_puts_matching("zwei", ALWAYS);
    storage.fail_deletes(ALWAYS);

    let files = vec![pdf_file("eins.pdf", 16), pdf_file("zwei.pdf", 16)];
    let err = service.upload_files(&files, batch_time()).await.unwrap_err();

    // The upload error survives even though the compensation also failed
    match err {
        AppError::FileUpload(msg) => assert_eq!(msg, "Failed to upload file \"zwei.pdf\""),
        other => panic!("unexpected error: {:?}", other),
    }

    let first_url = RecordingStorage::url_for_key("antraege/1715941800000-0-eins.pdf");
    let calls = storage.delete_calls();
    assert_eq!(calls.len(), 4);
    for call in &calls {
        assert_eq!(call, &vec![first_url.clone()]);
    }
    assert_eq!(storage.live_urls(), vec![first_url]);
}

#[tokio::test]
async fn test_upload_passes_blob_options_through() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage);

    let files = vec![AttachmentFile::new(
        "nachweis.png",
        "image/png",
        vec![0u8; 8],
    )];
    service.upload_files(&files, batch_time()).await.unwrap();

    let puts = storage.puts();
    assert_eq!(puts[0].content_type.as_deref(), Some("image/png"));
    assert!(!puts[0].add_random_suffix);
    assert_eq!(puts[0].size, 8);
}

#[tokio::test(start_paused = true)]
async fn test_custom_retry_config_changes_attempt_budget() {
    let storage = RecordingStorage::new();
    let service = test_service(&storage)
        .with_retry_config(RetryConfig::new(1, Duration::from_millis(50)));

    storage.fail_puts_matching("bericht", ALWAYS);

    let files = vec![pdf_file("bericht.pdf", 16)];
    let err = service.upload_files(&files, batch_time()).await.unwrap_err();

    assert!(matches!(err, AppError::FileUpload(_)));

    let puts = storage.puts();
    assert_eq!(puts.len(), 2);
    assert_eq!(
        puts[1].at.duration_since(puts[0].at),
        Duration::from_millis(50)
    );
}

#[tokio::test]
async fn test_service_from_config() {
    let storage = RecordingStorage::new();
    let config = Config {
        environment: "test".to_string(),
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some("/tmp/antrag".to_string()),
        local_storage_base_url: Some("http://localhost:4000/files".to_string()),
        max_file_count: 2,
        max_file_size_bytes: 1024,
        max_total_upload_size_bytes: 2048,
        allowed_content_types: vec!["application/pdf".to_string()],
        upload_key_prefix: "uploads".to_string(),
        upload_access: BlobAccess::Private,
        upload_cache_max_age_secs: 3600,
        upload_max_retries: 0,
        upload_retry_delay_ms: 10,
    };

    let service = AttachmentService::from_config(Arc::new(storage.clone()), &config);

    let files = vec![pdf_file("antrag.pdf", 16)];
    let urls = service.upload_files(&files, batch_time()).await.unwrap();

    assert_eq!(
        urls,
        vec![RecordingStorage::url_for_key(
            "uploads/1715941800000-0-antrag.pdf"
        )]
    );

    // Limits come from the config: a third file over the count limit fails
    let too_many = vec![
        pdf_file("a.pdf", 16),
        pdf_file("b.pdf", 16),
        pdf_file("c.pdf", 16),
    ];
    assert!(service.validate_files(&too_many).is_err());
}
