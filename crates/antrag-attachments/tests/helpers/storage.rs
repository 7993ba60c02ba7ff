//! Scriptable in-memory storage backend that records every call.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use antrag_core::StorageBackend;
use antrag_storage::{BlobStorage, PutOptions, PutResult, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

/// Marker value for "fail every time".
pub const ALWAYS: u32 = u32::MAX;

/// A put call observed by the recording backend, including failed attempts.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub size: usize,
    pub content_type: Option<String>,
    pub add_random_suffix: bool,
    /// Tokio clock timestamp of the attempt; exact under a paused clock.
    pub at: Instant,
}

/// Internal state, grouped into a single struct for simplified locking.
#[derive(Default)]
struct RecordingState {
    puts: Vec<RecordedPut>,
    delete_calls: Vec<Vec<String>>,
    live_urls: HashSet<String>,
    /// Key marker -> remaining injected put failures.
    put_failures: HashMap<String, u32>,
    /// Remaining injected delete-call failures.
    delete_failures: u32,
}

/// In-memory `BlobStorage` for orchestration tests.
///
/// Records every put attempt and delete call, tracks which URLs are live,
/// and can be scripted to fail puts (by key marker) or whole delete calls.
#[derive(Clone, Default)]
pub struct RecordingStorage {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The URL this backend hands out for a key.
    pub fn url_for_key(key: &str) -> String {
        format!("https://blob.example.test/{}", key)
    }

    /// Fail the next `times` puts whose key contains `marker`.
    pub fn fail_puts_matching(&self, marker: impl Into<String>, times: u32) {
        let mut state = self.state.lock().unwrap();
        state.put_failures.insert(marker.into(), times);
    }

    /// Fail the next `times` delete calls.
    pub fn fail_deletes(&self, times: u32) {
        self.state.lock().unwrap().delete_failures = times;
    }

    /// Every put attempt in call order.
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.state.lock().unwrap().puts.clone()
    }

    /// Every delete call with the URL set it received.
    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    /// URLs currently stored (successful puts minus successful deletes).
    pub fn live_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .live_urls
            .iter()
            .cloned()
            .collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl BlobStorage for RecordingStorage {
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<PutResult> {
        let mut state = self.state.lock().unwrap();

        state.puts.push(RecordedPut {
            key: key.to_string(),
            size: data.len(),
            content_type: options.content_type.clone(),
            add_random_suffix: options.add_random_suffix,
            at: Instant::now(),
        });

        for (marker, remaining) in state.put_failures.iter_mut() {
            if key.contains(marker.as_str()) && *remaining > 0 {
                if *remaining != ALWAYS {
                    *remaining -= 1;
                }
                return Err(StorageError::UploadFailed(format!(
                    "injected failure for {}",
                    key
                )));
            }
        }

        let url = Self::url_for_key(key);
        state.live_urls.insert(url.clone());
        Ok(PutResult {
            key: key.to_string(),
            url,
        })
    }

    async fn delete(&self, urls: &[String]) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();

        state.delete_calls.push(urls.to_vec());

        if state.delete_failures > 0 {
            if state.delete_failures != ALWAYS {
                state.delete_failures -= 1;
            }
            return Err(StorageError::DeleteFailed(
                "injected delete failure".to_string(),
            ));
        }

        for url in urls {
            state.live_urls.remove(url);
        }
        Ok(())
    }

    async fn exists(&self, url: &str) -> StorageResult<bool> {
        Ok(self.state.lock().unwrap().live_urls.contains(url))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
