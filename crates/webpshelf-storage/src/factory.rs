#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-memory")]
use crate::MemoryStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use webpshelf_core::Config;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::from_config(config)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.as_deref().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)"
                .to_string(),
        )),
    }
}
