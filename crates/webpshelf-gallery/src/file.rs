//! Uploaded file abstraction

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// An uploaded file: its declared content type and a readable path.
///
/// Files built from bytes own a temporary file that is removed on drop.
#[derive(Debug)]
pub struct UploadedFile {
    content_type: Option<String>,
    path: PathBuf,
    _temp: Option<NamedTempFile>,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>, content_type: Option<&str>) -> Self {
        UploadedFile {
            content_type: content_type.map(str::to_string),
            path: path.into(),
            _temp: None,
        }
    }

    /// Spool `data` to a temporary file.
    pub fn from_bytes(data: &[u8], content_type: Option<&str>) -> io::Result<Self> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(data)?;
        temp.flush()?;

        Ok(UploadedFile {
            content_type: content_type.map(str::to_string),
            path: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared content type is `image/*`.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }
}
