//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The collection manager only needs whole-object puts, deletes, server-side
/// copies and metadata lookups. Backends apply the configured access policy
/// to every object they write or copy.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to `storage_key`, replacing any existing object.
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// Delete a file by its storage key. Deleting an absent object succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Copy a file from one key to another, overwriting the destination.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()>;

    /// Metadata-only lookup.
    ///
    /// Returns `Ok(false)` when the object does not exist; every other failure
    /// is an error.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
