use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use webpshelf_core::Config;

/// S3 storage implementation
///
/// Every put and copy carries the configured canned ACL.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    acl: ObjectCannedAcl,
}

impl S3Storage {
    /// Create a new S3Storage from the collection configuration.
    ///
    /// Uses the configured credentials when both parts are present and the
    /// custom endpoint (path-style addressing) for S3-compatible providers.
    pub fn from_config(config: &Config) -> StorageResult<Self> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
        let region = config
            .region
            .clone()
            .ok_or_else(|| StorageError::ConfigError("S3_REGION not configured".to_string()))?;

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region));

        if let Some(credentials) = config.credentials() {
            builder = builder.credentials_provider(Credentials::new(
                credentials.access_key_id,
                credentials.secret_access_key,
                None,
                None,
                "webpshelf",
            ));
        }

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(S3Storage {
            client: Client::from_conf(builder.build()),
            bucket,
            acl: ObjectCannedAcl::from(config.acl.as_str()),
        })
    }

    /// `x-amz-copy-source` value: bucket and key with each key segment URL-encoded.
    fn copy_source(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.bucket, encoded.join("/"))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(self.acl.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(storage_key.to_string())
                } else {
                    StorageError::DownloadFailed(e.to_string())
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes();

        Ok(bytes)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        // S3 reports success for absent keys.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(self.copy_source(from_key))
            .key(to_key)
            .acl(self.acl.clone())
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().and_then(|se| se.code()) == Some("NoSuchKey") {
                    return StorageError::NotFound(from_key.to_string());
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    from_key = %from_key,
                    to_key = %to_key,
                    "S3 copy failed"
                );
                StorageError::CopyFailed(e.to_string())
            })?;

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 copy successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
