//! Webpshelf Storage Library
//!
//! This crate provides the storage abstraction used by the image collection
//! manager and its implementations: S3 through the AWS SDK, local filesystem
//! and in-memory through `object_store`.
//!
//! # Storage key format
//!
//! Every image variant lives at `{prefix}/{identifier}/{variant}[_{index}].webp`.
//! The numeric suffix is omitted for index 0 and the prefix segment is omitted
//! when no prefix is configured. Key generation is centralized in the [`keys`]
//! module so all callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(any(feature = "storage-local", feature = "storage-memory"))]
pub mod object;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{key_suffix, object_key};
#[cfg(feature = "storage-local")]
pub use object::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use object::MemoryStorage;
#[cfg(any(feature = "storage-local", feature = "storage-memory"))]
pub use object::ObjectStoreStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use webpshelf_core::StorageBackend;
