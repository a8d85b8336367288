//! Webpshelf Gallery Library
//!
//! Manages an ordered, gap-free collection of WebP images per entity. Each
//! image slot is stored once per configured variant under a deterministic key
//! and the number of slots is kept on an external record.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use webpshelf_gallery::{CollectionManager, UploadedFile};
//!
//! webpshelf_core::configure(|c| {
//!     c.bucket = Some("my-bucket".to_string());
//!     c.access_key_id = Some("AKIA...".to_string());
//!     c.secret_access_key = Some("...".to_string());
//! });
//!
//! let gallery = CollectionManager::for_identifier("red-shoe")?;
//! let file = UploadedFile::new("/tmp/upload.jpg", Some("image/jpeg"));
//! let index = gallery.upload(&file).await?;
//! println!("{}", gallery.thumbnail_url(index));
//! # Ok(())
//! # }
//! ```

pub mod count;
pub mod error;
pub mod file;
pub mod manager;
pub mod record;

pub use count::CountLocation;
pub use error::{OperationError, RecordError, SetupError};
pub use file::UploadedFile;
pub use manager::{CollectionManager, CollectionManagerBuilder, Subject};
pub use record::{ImageRecord, JsonRecord};
