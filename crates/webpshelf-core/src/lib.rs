//! Webpshelf Core Library
//!
//! This crate provides the configuration, error types and shared constants
//! used by every other webpshelf crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{configuration, configure, Config, Credentials};
pub use error::ConfigError;
pub use storage_types::StorageBackend;
