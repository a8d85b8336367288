use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "webp")]
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid max dimension: {0}")]
    InvalidDimension(u32),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}
