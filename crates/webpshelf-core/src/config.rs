//! Configuration module
//!
//! Connection and policy parameters for one image collection: where objects
//! live, how they are encoded, and where the image count is kept on the
//! external record.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACL, DEFAULT_COUNT_ATTRIBUTE, DEFAULT_IDENTIFIER_ATTRIBUTE, DEFAULT_ORIGINAL_MAX_SIZE,
    DEFAULT_REGION, DEFAULT_THUMBNAIL_MAX_SIZE, DEFAULT_WEBP_QUALITY, ORIGINAL_VARIANT,
    THUMBNAIL_VARIANT,
};
use crate::error::ConfigError;
use crate::storage_types::StorageBackend;

/// Access key pair for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Image collection configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub prefix: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub variant_max_dimension: BTreeMap<String, u32>,
    pub webp_quality: u8,
    pub acl: String,
    /// Variants written for every image, in order.
    pub variants: Vec<String>,
    /// Record attribute used as the storage folder name.
    pub identifier_attribute: String,
    /// Direct count field, or the key inside `count_container` when that is set.
    pub count_attribute: String,
    /// JSON field on the record holding the count under `count_attribute`.
    pub count_container: Option<String>,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let variant_max_dimension = BTreeMap::from([
            (ORIGINAL_VARIANT.to_string(), DEFAULT_ORIGINAL_MAX_SIZE),
            (THUMBNAIL_VARIANT.to_string(), DEFAULT_THUMBNAIL_MAX_SIZE),
        ]);

        Config {
            bucket: None,
            region: Some(DEFAULT_REGION.to_string()),
            prefix: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            variant_max_dimension,
            webp_quality: DEFAULT_WEBP_QUALITY,
            acl: DEFAULT_ACL.to_string(),
            variants: vec![ORIGINAL_VARIANT.to_string(), THUMBNAIL_VARIANT.to_string()],
            identifier_attribute: DEFAULT_IDENTIFIER_ATTRIBUTE.to_string(),
            count_attribute: DEFAULT_COUNT_ATTRIBUTE.to_string(),
            count_container: None,
            storage_backend: StorageBackend::S3,
            local_storage_path: None,
        }
    }
}

/// Raw environment variables, deserialized by `envy`.
#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    s3_bucket: Option<String>,
    s3_region: Option<String>,
    s3_prefix: Option<String>,
    s3_endpoint: Option<String>,
    aws_access_key_id: Option<String>,
    aws_secret_access_key: Option<String>,
    image_original_max_size: Option<u32>,
    image_thumbnail_max_size: Option<u32>,
    image_webp_quality: Option<u8>,
    image_acl: Option<String>,
    image_variants: Option<Vec<String>>,
    storage_backend: Option<String>,
    local_storage_path: Option<String>,
}

impl Config {
    /// Build a configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let settings: EnvSettings = envy::from_env()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: EnvSettings) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        config.bucket = settings.s3_bucket;
        if let Some(region) = settings.s3_region {
            config.region = Some(region);
        }
        config.prefix = settings.s3_prefix;
        config.endpoint = settings.s3_endpoint;
        config.access_key_id = settings.aws_access_key_id;
        config.secret_access_key = settings.aws_secret_access_key;

        if let Some(size) = settings.image_original_max_size {
            config
                .variant_max_dimension
                .insert(ORIGINAL_VARIANT.to_string(), size);
        }
        if let Some(size) = settings.image_thumbnail_max_size {
            config
                .variant_max_dimension
                .insert(THUMBNAIL_VARIANT.to_string(), size);
        }
        if let Some(quality) = settings.image_webp_quality {
            config.webp_quality = quality;
        }
        if let Some(acl) = settings.image_acl {
            config.acl = acl;
        }
        if let Some(variants) = settings.image_variants {
            config.variants = variants
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
        }
        if let Some(backend) = settings.storage_backend {
            config.storage_backend =
                backend
                    .parse()
                    .map_err(|e: anyhow::Error| ConfigError::InvalidValue {
                        field: "storage_backend",
                        message: e.to_string(),
                    })?;
        }
        config.local_storage_path = settings.local_storage_path;

        Ok(config)
    }

    /// Fail with the first missing required field.
    ///
    /// Checked in order: bucket, region, access key, secret key. Blank strings
    /// count as missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        if !present(&self.bucket) {
            return Err(ConfigError::MissingField("bucket"));
        }
        if !present(&self.region) {
            return Err(ConfigError::MissingField("region"));
        }
        if !present(&self.access_key_id) {
            return Err(ConfigError::MissingField("access_key_id"));
        }
        if !present(&self.secret_access_key) {
            return Err(ConfigError::MissingField("secret_access_key"));
        }
        if !(1..=100).contains(&self.webp_quality) {
            return Err(ConfigError::InvalidValue {
                field: "webp_quality",
                message: format!("{} is outside 1..=100", self.webp_quality),
            });
        }
        Ok(())
    }

    /// Public URL root for the collection, without touching the store.
    ///
    /// AWS: `https://{bucket}.s3.{region}.amazonaws.com[/{prefix}]`.
    /// Custom endpoint (path style): `{endpoint}/{bucket}[/{prefix}]`.
    pub fn base_url(&self) -> String {
        let bucket = self.bucket.as_deref().unwrap_or_default();
        let root = match self.endpoint.as_deref() {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                bucket,
                self.region.as_deref().unwrap_or_default()
            ),
        };

        match self.key_prefix() {
            Some(prefix) => format!("{}/{}", root, prefix),
            None => root,
        }
    }

    /// Key prefix with surrounding slashes removed; `None` when empty.
    pub fn key_prefix(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
            }),
            _ => None,
        }
    }

    /// Longest edge for a variant. Unknown variants use the original size.
    pub fn max_dimension(&self, variant: &str) -> u32 {
        self.variant_max_dimension
            .get(variant)
            .or_else(|| self.variant_max_dimension.get(ORIGINAL_VARIANT))
            .copied()
            .unwrap_or(DEFAULT_ORIGINAL_MAX_SIZE)
    }

    /// Add a variant (or change its size if already configured).
    pub fn with_variant(mut self, name: impl Into<String>, max_dimension: u32) -> Self {
        let name = name.into();
        if !self.variants.contains(&name) {
            self.variants.push(name.clone());
        }
        self.variant_max_dimension.insert(name, max_dimension);
        self
    }
}

static DEFAULT_CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn default_config() -> &'static RwLock<Config> {
    DEFAULT_CONFIG.get_or_init(|| {
        let config = Config::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring invalid environment configuration");
            Config::default()
        });
        RwLock::new(config)
    })
}

/// Adjust the process-wide default configuration.
///
/// The default starts from [`Config::from_env`] on first access.
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut Config),
{
    let mut guard = default_config()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}

/// Snapshot of the process-wide default configuration.
pub fn configuration() -> Config {
    default_config()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
