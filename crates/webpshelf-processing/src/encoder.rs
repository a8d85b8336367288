//! Encoder abstraction

use crate::error::EncodeError;
use bytes::Bytes;
use std::path::Path;

/// Turns a source image into one encoded rendition.
///
/// Implementations scale the source so its longest edge does not exceed
/// `max_dimension` (never upscaling) and encode at `quality` (1-100).
/// Encoding is CPU-bound and synchronous; async callers should run it on a
/// blocking thread.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, source: &Path, max_dimension: u32, quality: u8) -> Result<Bytes, EncodeError>;
}
