//! Shared constants

/// Region used when neither the configuration nor `S3_REGION` provide one.
pub const DEFAULT_REGION: &str = "ap-south-1";

pub const ORIGINAL_VARIANT: &str = "original";
pub const THUMBNAIL_VARIANT: &str = "thumbnail";

pub const DEFAULT_ORIGINAL_MAX_SIZE: u32 = 1200;
pub const DEFAULT_THUMBNAIL_MAX_SIZE: u32 = 300;
pub const DEFAULT_WEBP_QUALITY: u8 = 85;
pub const DEFAULT_ACL: &str = "public-read";

pub const DEFAULT_IDENTIFIER_ATTRIBUTE: &str = "slug";
pub const DEFAULT_COUNT_ATTRIBUTE: &str = "image_count";

/// Container field consulted when neither the configured container nor the
/// direct count field exist on a record. Older records keep their count here.
pub const LEGACY_COUNT_CONTAINER: &str = "specifications";
pub const LEGACY_COUNT_KEY: &str = "image_count";

/// Field stamped on every count write.
pub const UPDATED_AT_FIELD: &str = "updated_at";

pub const WEBP_EXTENSION: &str = "webp";
pub const WEBP_CONTENT_TYPE: &str = "image/webp";
