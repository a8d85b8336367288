#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use std::sync::Arc;
use webpshelf_core::Config;
use webpshelf_gallery::{CollectionManager, ImageRecord, JsonRecord};

pub use fixtures::{init_tracing, png_upload, TaggingEncoder};
pub use storage::RecordingStorage;

/// Valid configuration pointing at a fictitious AWS bucket.
pub fn test_config() -> Config {
    Config {
        bucket: Some("test-bucket".to_string()),
        region: Some("us-east-1".to_string()),
        prefix: Some("products".to_string()),
        access_key_id: Some("AKIATEST".to_string()),
        secret_access_key: Some("test-secret".to_string()),
        ..Config::default()
    }
}

/// Record holding `slug` and a zero `image_count`.
pub fn slug_record(slug: &str) -> Arc<JsonRecord> {
    let value = serde_json::json!({"slug": slug, "image_count": 0});
    Arc::new(JsonRecord::from_value(value).expect("record must be an object"))
}

/// A record, its store and a manager wired together over in-memory storage.
pub struct TestGallery {
    pub record: Arc<JsonRecord>,
    pub storage: Arc<RecordingStorage>,
    pub manager: CollectionManager,
}

impl TestGallery {
    pub fn count_field(&self) -> Option<serde_json::Value> {
        self.record.get("image_count")
    }

    pub async fn object(&self, variant: &str, index: usize) -> Option<Vec<u8>> {
        self.storage
            .object(&self.manager.key(variant, index))
            .await
    }
}

/// Gallery for a record with a direct `image_count` field.
pub fn setup_gallery() -> TestGallery {
    setup_gallery_with(
        serde_json::json!({"slug": "red-shoe", "image_count": 0}),
        test_config(),
    )
}

pub fn setup_gallery_with(record: serde_json::Value, config: Config) -> TestGallery {
    init_tracing();

    let record = Arc::new(JsonRecord::from_value(record).expect("record must be an object"));
    let storage = Arc::new(RecordingStorage::new());
    let manager = CollectionManager::builder(record.clone() as Arc<dyn ImageRecord>)
        .config(config)
        .storage(storage.clone())
        .encoder(Arc::new(TaggingEncoder::new()))
        .build()
        .expect("manager should build");

    TestGallery {
        record,
        storage,
        manager,
    }
}
