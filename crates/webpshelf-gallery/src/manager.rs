//! Collection manager
//!
//! Maps gap-free slot indices to object keys, one object per variant per
//! slot, and keeps the record's image count in step with the store.
//!
//! Operations run their store calls strictly in sequence. Nothing is rolled
//! back: a failure stops the operation where it is, logs it and returns the
//! error. Concurrent writers on the same identifier are not coordinated.

use crate::count::CountLocation;
use crate::error::{OperationError, RecordError, SetupError};
use crate::file::UploadedFile;
use crate::record::ImageRecord;
use std::sync::Arc;
use tokio::sync::OnceCell;
use webpshelf_core::constants::{ORIGINAL_VARIANT, THUMBNAIL_VARIANT, WEBP_CONTENT_TYPE};
use webpshelf_core::Config;
use webpshelf_processing::{ImageEncoder, WebpEncoder};
use webpshelf_storage::{create_storage, key_suffix, object_key, Storage, StorageResult};

/// What a collection belongs to.
#[derive(Clone)]
pub enum Subject {
    /// A bare storage identifier. Without a record the count is always 0.
    Identifier(String),
    Record(Arc<dyn ImageRecord>),
}

impl Subject {
    pub fn record(record: impl ImageRecord + 'static) -> Self {
        Subject::Record(Arc::new(record))
    }
}

impl From<&str> for Subject {
    fn from(identifier: &str) -> Self {
        Subject::Identifier(identifier.to_string())
    }
}

impl From<String> for Subject {
    fn from(identifier: String) -> Self {
        Subject::Identifier(identifier)
    }
}

impl From<Arc<dyn ImageRecord>> for Subject {
    fn from(record: Arc<dyn ImageRecord>) -> Self {
        Subject::Record(record)
    }
}

pub struct CollectionManagerBuilder {
    subject: Subject,
    identifier: Option<String>,
    config: Option<Config>,
    storage: Option<Arc<dyn Storage>>,
    encoder: Option<Arc<dyn ImageEncoder>>,
}

impl CollectionManagerBuilder {
    /// Use this identifier instead of deriving one from the subject.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Defaults to the process-wide configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Defaults to a backend created from the configuration on first use.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Defaults to [`WebpEncoder`].
    pub fn encoder(mut self, encoder: Arc<dyn ImageEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn build(self) -> Result<CollectionManager, SetupError> {
        let config = self.config.unwrap_or_else(webpshelf_core::configuration);
        config.validate()?;

        let identifier = match self.identifier {
            Some(identifier) => identifier,
            None => resolve_identifier(&self.subject, &config).unwrap_or_default(),
        };
        if identifier.trim().is_empty() {
            return Err(SetupError::BlankIdentifier);
        }

        let record = match self.subject {
            Subject::Record(record) => Some(record),
            Subject::Identifier(_) => None,
        };

        Ok(CollectionManager {
            identifier,
            record,
            config,
            storage: OnceCell::new_with(self.storage),
            encoder: self
                .encoder
                .unwrap_or_else(|| Arc::new(WebpEncoder::new())),
        })
    }
}

/// Identifier attribute, then the record's param, then its id.
fn resolve_identifier(subject: &Subject, config: &Config) -> Option<String> {
    match subject {
        Subject::Identifier(identifier) => Some(identifier.clone()),
        Subject::Record(record) => record
            .attribute(&config.identifier_attribute)
            .or_else(|| record.to_param())
            .or_else(|| record.id()),
    }
}

pub struct CollectionManager {
    identifier: String,
    record: Option<Arc<dyn ImageRecord>>,
    config: Config,
    storage: OnceCell<Arc<dyn Storage>>,
    encoder: Arc<dyn ImageEncoder>,
}

impl CollectionManager {
    pub fn builder(subject: impl Into<Subject>) -> CollectionManagerBuilder {
        CollectionManagerBuilder {
            subject: subject.into(),
            identifier: None,
            config: None,
            storage: None,
            encoder: None,
        }
    }

    pub fn new(subject: impl Into<Subject>, config: Config) -> Result<Self, SetupError> {
        Self::builder(subject).config(config).build()
    }

    /// Manager for a record using the process-wide configuration.
    pub fn for_record(record: Arc<dyn ImageRecord>) -> Result<Self, SetupError> {
        Self::builder(record).build()
    }

    /// Manager for a bare identifier using the process-wide configuration.
    pub fn for_identifier(identifier: impl Into<String>) -> Result<Self, SetupError> {
        let identifier: String = identifier.into();
        Self::builder(identifier).build()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn record(&self) -> Option<&Arc<dyn ImageRecord>> {
        self.record.as_ref()
    }

    /// Upload a single image as a new slot at the end of the collection.
    ///
    /// Returns the new slot's index. A variant whose encoding fails is logged
    /// and skipped; the slot is still counted.
    pub async fn upload(&self, file: &UploadedFile) -> Result<usize, OperationError> {
        let result = self.append(file).await;
        self.log_failure("Upload failed", result)
    }

    async fn append(&self, file: &UploadedFile) -> Result<usize, OperationError> {
        ensure_image(file)?;
        let index = self.current_count().await?;
        self.upload_variants(file, index).await?;
        self.update_count(index + 1).await?;
        Ok(index)
    }

    /// Upload each file in order, returning the indices of those that succeeded.
    pub async fn upload_all<'a, I>(&self, files: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a UploadedFile>,
    {
        let mut indices = Vec::new();
        for file in files {
            if let Ok(index) = self.upload(file).await {
                indices.push(index);
            }
        }
        indices
    }

    /// Overwrite every variant of an existing slot. The count is unchanged.
    pub async fn replace(
        &self,
        index: usize,
        file: &UploadedFile,
    ) -> Result<usize, OperationError> {
        let result = self.overwrite(index, file).await;
        self.log_failure("Replace failed", result)
    }

    async fn overwrite(&self, index: usize, file: &UploadedFile) -> Result<usize, OperationError> {
        ensure_image(file)?;
        let count = self.current_count().await?;
        ensure_in_range(index, count)?;

        self.delete_variants(index).await?;
        self.upload_variants(file, index).await?;
        Ok(index)
    }

    /// Remove a slot and shift every later slot down by one.
    ///
    /// Slots are moved in ascending order, copying each variant before its
    /// source is deleted. A failure part-way leaves the store ahead of the
    /// count.
    pub async fn delete(&self, index: usize) -> Result<(), OperationError> {
        let result = self.remove(index).await;
        self.log_failure("Delete failed", result)
    }

    async fn remove(&self, index: usize) -> Result<(), OperationError> {
        let count = self.current_count().await?;
        ensure_in_range(index, count)?;

        self.delete_variants(index).await?;
        self.reindex_after_delete(index, count).await
    }

    /// Remove every slot and reset the count to 0.
    pub async fn delete_all(&self) -> Result<(), OperationError> {
        let result = self.clear().await;
        self.log_failure("Delete all failed", result)
    }

    async fn clear(&self) -> Result<(), OperationError> {
        let count = self.current_count().await?;
        for index in 0..count {
            self.delete_variants(index).await?;
        }
        self.update_count(0).await?;
        Ok(())
    }

    /// Public URL of a variant at a slot. Never touches the store.
    pub fn url(&self, variant: &str, index: usize) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url(),
            self.identifier,
            key_suffix(variant, index)
        )
    }

    /// URLs of a variant for every slot, in index order.
    pub async fn urls(&self, variant: &str) -> Result<Vec<String>, RecordError> {
        let count = self.current_count().await?;
        Ok((0..count).map(|i| self.url(variant, i)).collect())
    }

    pub fn original_url(&self, index: usize) -> String {
        self.url(ORIGINAL_VARIANT, index)
    }

    pub fn thumbnail_url(&self, index: usize) -> String {
        self.url(THUMBNAIL_VARIANT, index)
    }

    /// Whether the original variant of a slot exists in the store.
    ///
    /// Not-found is `Ok(false)`; any other store failure is returned as is.
    pub async fn exists(&self, index: usize) -> StorageResult<bool> {
        let storage = self.storage().await?;
        storage.exists(&self.key(ORIGINAL_VARIANT, index)).await
    }

    /// Number of slots, read from the record on every call.
    pub async fn count(&self) -> Result<usize, RecordError> {
        self.current_count().await
    }

    pub async fn has_images(&self) -> Result<bool, RecordError> {
        Ok(self.current_count().await? > 0)
    }

    /// Object key of a variant at a slot.
    pub fn key(&self, variant: &str, index: usize) -> String {
        object_key(self.config.key_prefix(), &self.identifier, variant, index)
    }

    async fn storage(&self) -> StorageResult<&Arc<dyn Storage>> {
        self.storage
            .get_or_try_init(|| create_storage(&self.config))
            .await
    }

    async fn current_count(&self) -> Result<usize, RecordError> {
        match &self.record {
            Some(record) => {
                CountLocation::resolve(&self.config, record.as_ref())
                    .read(record.as_ref())
                    .await
            }
            None => Ok(0),
        }
    }

    async fn update_count(&self, count: usize) -> Result<(), RecordError> {
        match &self.record {
            Some(record) => {
                CountLocation::resolve(&self.config, record.as_ref())
                    .write(record.as_ref(), count)
                    .await
            }
            None => Ok(()),
        }
    }

    async fn upload_variants(&self, file: &UploadedFile, index: usize) -> StorageResult<()> {
        let storage = self.storage().await?;

        for variant in &self.config.variants {
            let max_dimension = self.config.max_dimension(variant);
            let Some(data) = self.encode(file, variant, max_dimension).await else {
                continue;
            };

            storage
                .put(&self.key(variant, index), data, WEBP_CONTENT_TYPE)
                .await?;
        }

        Ok(())
    }

    /// Encode on a blocking thread. Failures are logged and yield `None`.
    async fn encode(
        &self,
        file: &UploadedFile,
        variant: &str,
        max_dimension: u32,
    ) -> Option<bytes::Bytes> {
        let encoder = Arc::clone(&self.encoder);
        let source = file.path().to_path_buf();
        let quality = self.config.webp_quality;

        let result = tokio::task::spawn_blocking(move || {
            encoder
                .encode(&source, max_dimension, quality)
                .map_err(|e| e.to_string())
        })
        .await
        .unwrap_or_else(|e| Err(e.to_string()));

        match result {
            Ok(data) => Some(data),
            Err(error) => {
                tracing::error!(
                    identifier = %self.identifier,
                    variant = %variant,
                    source = %file.path().display(),
                    error = %error,
                    "WebP conversion failed"
                );
                None
            }
        }
    }

    async fn delete_variants(&self, index: usize) -> StorageResult<()> {
        let storage = self.storage().await?;
        for variant in &self.config.variants {
            storage.delete(&self.key(variant, index)).await?;
        }
        Ok(())
    }

    async fn reindex_after_delete(
        &self,
        deleted_index: usize,
        total: usize,
    ) -> Result<(), OperationError> {
        let storage = self.storage().await?;

        for index in (deleted_index + 1)..total {
            for variant in &self.config.variants {
                let from = self.key(variant, index);
                let to = self.key(variant, index - 1);

                match storage.copy(&from, &to).await {
                    Ok(()) => {}
                    // Slot was written without this variant; nothing to move.
                    Err(e) if e.is_not_found() => {
                        tracing::warn!(
                            identifier = %self.identifier,
                            key = %from,
                            "Variant missing during reindex, skipping"
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
                storage.delete(&from).await?;
            }
        }

        self.update_count(total.saturating_sub(1)).await?;

        tracing::debug!(
            identifier = %self.identifier,
            deleted_index,
            moved = total.saturating_sub(deleted_index + 1),
            "Reindexed collection after delete"
        );

        Ok(())
    }

    fn log_failure<T>(
        &self,
        message: &str,
        result: Result<T, OperationError>,
    ) -> Result<T, OperationError> {
        if let Err(ref e) = result {
            if e.is_rejection() {
                tracing::debug!(
                    identifier = %self.identifier,
                    reason = %e,
                    "{} (rejected)",
                    message
                );
            } else {
                tracing::error!(identifier = %self.identifier, error = %e, "{}", message);
            }
        }
        result
    }
}

fn ensure_image(file: &UploadedFile) -> Result<(), OperationError> {
    if file.is_image() {
        Ok(())
    } else {
        Err(OperationError::NotAnImage {
            content_type: file.content_type().map(str::to_string),
        })
    }
}

fn ensure_in_range(index: usize, count: usize) -> Result<(), OperationError> {
    if index < count {
        Ok(())
    } else {
        Err(OperationError::IndexOutOfRange { index, count })
    }
}
