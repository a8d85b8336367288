//! Error types for the collection manager.

use thiserror::Error;
use webpshelf_core::ConfigError;
use webpshelf_storage::StorageError;

/// Failures reading or writing the external record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Record backend error: {0}")]
    Backend(String),
}

/// Errors raised while constructing a manager. These always propagate.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("identifier cannot be blank")]
    BlankIdentifier,
}

/// Outcome of a failed or rejected collection operation.
///
/// Rejections (`NotAnImage`, `IndexOutOfRange`) happen before any side
/// effect. Storage and record failures are logged by the manager before being
/// returned and may leave a partially applied operation behind.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("content type {content_type:?} is not an image")]
    NotAnImage { content_type: Option<String> },

    #[error("index {index} is out of range for {count} images")]
    IndexOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl OperationError {
    /// Whether the operation was refused without touching the store or record.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OperationError::NotAnImage { .. } | OperationError::IndexOutOfRange { .. }
        )
    }
}
