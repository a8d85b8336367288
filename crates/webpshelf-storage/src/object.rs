use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
#[cfg(feature = "storage-local")]
use object_store::local::LocalFileSystem;
#[cfg(feature = "storage-memory")]
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};

/// Storage backed by any `object_store` implementation.
///
/// Used for the local filesystem and in-memory backends. Neither has a notion
/// of object ACLs, so the access policy is not applied here.
pub struct ObjectStoreStorage<S> {
    store: S,
    backend: StorageBackend,
    /// Root description used in log fields (directory or "memory").
    root: String,
    /// Whether the store accepts content-type attributes on put.
    supports_attributes: bool,
}

#[cfg(feature = "storage-local")]
pub type LocalStorage = ObjectStoreStorage<LocalFileSystem>;

#[cfg(feature = "storage-memory")]
pub type MemoryStorage = ObjectStoreStorage<InMemory>;

#[cfg(feature = "storage-local")]
impl ObjectStoreStorage<LocalFileSystem> {
    /// Create a new LocalStorage instance rooted at `base_path`.
    ///
    /// The directory is created if missing.
    pub async fn new(base_path: impl Into<std::path::PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        tokio::fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let store = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(ObjectStoreStorage {
            store,
            backend: StorageBackend::Local,
            root: base_path.display().to_string(),
            // LocalFileSystem rejects put attributes.
            supports_attributes: false,
        })
    }
}

#[cfg(feature = "storage-memory")]
impl ObjectStoreStorage<InMemory> {
    pub fn new() -> Self {
        ObjectStoreStorage {
            store: InMemory::new(),
            backend: StorageBackend::Memory,
            root: "memory".to_string(),
            supports_attributes: true,
        }
    }
}

#[cfg(feature = "storage-memory")]
impl Default for ObjectStoreStorage<InMemory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ObjectStore> ObjectStoreStorage<S> {
    /// Convert a storage key to an object path, rejecting keys that could
    /// escape the store root.
    fn location(storage_key: &str) -> StorageResult<Path> {
        if storage_key.is_empty()
            || storage_key.starts_with('/')
            || storage_key.split('/').any(|segment| segment == "..")
        {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }
        Path::parse(storage_key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }

    fn put_options(&self, content_type: &str) -> PutOptions {
        let mut attributes = Attributes::new();
        if self.supports_attributes {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
        }
        PutOptions {
            attributes,
            ..Default::default()
        }
    }
}

#[async_trait]
impl<S: ObjectStore> Storage for ObjectStoreStorage<S> {
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let location = Self::location(storage_key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(
                &location,
                PutPayload::from(data),
                self.put_options(content_type),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                root = %self.root,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object store upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::debug!(
            root = %self.root,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store upload successful"
        );

        Ok(())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        let location = Self::location(storage_key)?;

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let location = Self::location(storage_key)?;

        match self.store.delete(&location).await {
            Ok(()) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(key = %storage_key, "Delete of absent object ignored");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    root = %self.root,
                    key = %storage_key,
                    "Object store delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let from = Self::location(from_key)?;
        let to = Self::location(to_key)?;

        let copy_result: ObjectResult<_> = self.store.copy(&from, &to).await;

        copy_result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(from_key.to_string()),
            other => StorageError::CopyFailed(other.to_string()),
        })?;

        tracing::debug!(from_key = %from_key, to_key = %to_key, "Object store copy successful");

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Self::location(storage_key)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
