//! WebP encoder built on the `image` and `webp` crates.

use crate::calculations::fit_within;
use crate::encoder::ImageEncoder;
use crate::error::EncodeError;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;

/// Lossy WebP encoder. Downscales with Lanczos3 before encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebpEncoder;

impl WebpEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode an already decoded image.
    pub fn encode_image(
        img: &DynamicImage,
        max_dimension: u32,
        quality: u8,
    ) -> Result<Bytes, EncodeError> {
        if max_dimension == 0 {
            return Err(EncodeError::InvalidDimension(max_dimension));
        }

        let (width, height) = img.dimensions();
        let resized;
        let img = match fit_within((width, height), max_dimension) {
            Some((w, h)) => {
                resized = img.resize_exact(w, h, FilterType::Lanczos3);
                &resized
            }
            None => img,
        };

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(quality.clamp(1, 100) as f32);

        if webp_data.is_empty() {
            return Err(EncodeError::EncodingFailed(format!(
                "libwebp produced no output for {}x{} image",
                width, height
            )));
        }

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}

impl ImageEncoder for WebpEncoder {
    fn encode(&self, source: &Path, max_dimension: u32, quality: u8) -> Result<Bytes, EncodeError> {
        let start = std::time::Instant::now();
        let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
        let encoded = Self::encode_image(&img, max_dimension, quality)?;

        tracing::debug!(
            source = %source.display(),
            max_dimension,
            quality,
            size_bytes = encoded.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "WebP conversion successful"
        );

        Ok(encoded)
    }
}
