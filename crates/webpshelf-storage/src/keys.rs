//! Shared key generation.
//!
//! Key format: `{prefix}/{identifier}/{variant}[_{index}].webp`. Index 0 has no
//! numeric suffix. Without a prefix the key starts at the identifier.

use webpshelf_core::constants::WEBP_EXTENSION;

/// File name of a variant at a slot index, e.g. `original.webp`, `thumbnail_3.webp`.
pub fn key_suffix(variant: &str, index: usize) -> String {
    if index == 0 {
        format!("{}.{}", variant, WEBP_EXTENSION)
    } else {
        format!("{}_{}.{}", variant, index, WEBP_EXTENSION)
    }
}

/// Full object key for a variant at a slot index.
pub fn object_key(prefix: Option<&str>, identifier: &str, variant: &str, index: usize) -> String {
    match prefix {
        Some(prefix) => format!("{}/{}/{}", prefix, identifier, key_suffix(variant, index)),
        None => format!("{}/{}", identifier, key_suffix(variant, index)),
    }
}
