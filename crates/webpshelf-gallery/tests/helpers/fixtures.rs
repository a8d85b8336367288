use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use webpshelf_gallery::UploadedFile;
use webpshelf_processing::{EncodeError, ImageEncoder};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Encode a solid-colour PNG of the given size.
pub fn create_test_png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([shade, 0, 255 - shade, 255]),
    ));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("PNG encoding should succeed");
    buffer
}

/// A PNG upload spooled to a temporary file.
pub fn png_upload(width: u32, height: u32, shade: u8) -> UploadedFile {
    UploadedFile::from_bytes(&create_test_png(width, height, shade), Some("image/png"))
        .expect("temp file should be writable")
}

/// An upload whose content is an arbitrary marker rather than an image.
///
/// Only useful with [`TaggingEncoder`], which never decodes its input.
pub fn marker_upload(marker: &str) -> UploadedFile {
    UploadedFile::from_bytes(marker.as_bytes(), Some("image/png"))
        .expect("temp file should be writable")
}

/// Deterministic encoder: output is `"{max_dimension}:"` followed by the
/// source bytes, so tests can tell which slot and variant an object came from.
#[derive(Default)]
pub struct TaggingEncoder {
    failing_dimensions: Mutex<HashSet<u32>>,
}

impl TaggingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every encode targeting this maximum dimension.
    pub fn fail_dimension(self, max_dimension: u32) -> Self {
        self.failing_dimensions
            .lock()
            .unwrap()
            .insert(max_dimension);
        self
    }

    pub fn tag(max_dimension: u32, source: &[u8]) -> Vec<u8> {
        let mut out = format!("{}:", max_dimension).into_bytes();
        out.extend_from_slice(source);
        out
    }
}

impl ImageEncoder for TaggingEncoder {
    fn encode(
        &self,
        source: &Path,
        max_dimension: u32,
        _quality: u8,
    ) -> Result<Bytes, EncodeError> {
        if self.failing_dimensions.lock().unwrap().contains(&max_dimension) {
            return Err(EncodeError::EncodingFailed(format!(
                "refusing to encode at {}",
                max_dimension
            )));
        }
        let data = std::fs::read(source)?;
        Ok(Bytes::from(Self::tag(max_dimension, &data)))
    }
}
