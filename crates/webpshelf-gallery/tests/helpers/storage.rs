use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;
use webpshelf_storage::{MemoryStorage, Storage, StorageBackend, StorageError, StorageResult};

/// In-memory storage that records every mutating call and can be told to fail.
pub struct RecordingStorage {
    inner: MemoryStorage,
    calls: Mutex<Vec<String>>,
    fail_copy_from: Mutex<Option<String>>,
    fail_lookups: Mutex<bool>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        RecordingStorage {
            inner: MemoryStorage::new(),
            calls: Mutex::new(Vec::new()),
            fail_copy_from: Mutex::new(None),
            fail_lookups: Mutex::new(false),
        }
    }

    /// Make copies whose source is `key` fail with a backend error.
    pub fn fail_copy_from(&self, key: &str) {
        *self.fail_copy_from.lock().unwrap() = Some(key.to_string());
    }

    /// Make `exists` fail with a backend error.
    pub fn fail_lookups(&self) {
        *self.fail_lookups.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Object contents, or `None` if absent.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        match self.inner.download(key).await {
            Ok(data) => Some(data.to_vec()),
            Err(e) if e.is_not_found() => None,
            Err(e) => panic!("unexpected storage error: {e}"),
        }
    }

    /// Remove an object behind the manager's back.
    pub async fn remove(&self, key: &str) {
        self.inner.delete(key).await.unwrap();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.record(format!("put {}", storage_key));
        self.inner.put(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        self.inner.download(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.record(format!("delete {}", storage_key));
        self.inner.delete(storage_key).await
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        self.record(format!("copy {} -> {}", from_key, to_key));
        if self.fail_copy_from.lock().unwrap().as_deref() == Some(from_key) {
            return Err(StorageError::CopyFailed(format!("injected failure for {}", from_key)));
        }
        self.inner.copy(from_key, to_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        if *self.fail_lookups.lock().unwrap() {
            return Err(StorageError::BackendError("injected lookup failure".to_string()));
        }
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
