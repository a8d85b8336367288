//! Webpshelf Processing Library
//!
//! Converts uploaded images into bounded-size WebP renditions.
//!
//! - `ImageEncoder`: the encoding seam used by the collection manager
//! - `WebpEncoder`: decode with `image`, downscale, encode with `webp`
//! - `calculations`: pure dimension arithmetic

pub mod calculations;
pub mod encoder;
pub mod error;
#[cfg(feature = "webp")]
pub mod webp_encoder;

pub use calculations::fit_within;
pub use encoder::ImageEncoder;
pub use error::EncodeError;
#[cfg(feature = "webp")]
pub use webp_encoder::WebpEncoder;
