//! External record abstraction
//!
//! The entity that owns an image collection (a product, a listing, ...) lives
//! outside this crate. Applications implement [`ImageRecord`] once per entity
//! type; the manager uses it to resolve the storage identifier and to read and
//! write the image count.

use crate::error::RecordError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{PoisonError, RwLock};

#[async_trait]
pub trait ImageRecord: Send + Sync {
    /// String form of an attribute, if the record has it.
    ///
    /// Used with the configured identifier attribute (`slug` by default).
    fn attribute(&self, name: &str) -> Option<String>;

    /// URL parameter form of the record, tried when the identifier attribute
    /// is absent.
    fn to_param(&self) -> Option<String> {
        None
    }

    /// Primary key, tried last.
    fn id(&self) -> Option<String> {
        None
    }

    /// Whether the record declares a persisted field with this name.
    ///
    /// Decides where the image count is stored; see [`crate::CountLocation`].
    fn has_field(&self, name: &str) -> bool;

    /// Current value of a persisted field. `Ok(None)` for null or unset.
    async fn read_field(&self, name: &str) -> Result<Option<Value>, RecordError>;

    /// Persist several fields in one write.
    async fn update_fields(&self, fields: Map<String, Value>) -> Result<(), RecordError>;
}

/// In-memory record backed by a JSON object.
///
/// Every key present in the object counts as a declared field, including keys
/// whose value is `null`.
#[derive(Debug, Default)]
pub struct JsonRecord {
    fields: RwLock<Map<String, Value>>,
}

impl JsonRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        JsonRecord {
            fields: RwLock::new(fields),
        }
    }

    /// Build a record from a JSON value. Non-object values yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(fields)),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Copy of all fields.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ImageRecord for JsonRecord {
    fn attribute(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    async fn read_field(&self, name: &str) -> Result<Option<Value>, RecordError> {
        Ok(self.get(name).filter(|v| !v.is_null()))
    }

    async fn update_fields(&self, fields: Map<String, Value>) -> Result<(), RecordError> {
        let mut guard = self.fields.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend(fields);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(JsonRecord::from_value(json!([1, 2])).is_none());
        assert!(JsonRecord::from_value(json!({"slug": "a"})).is_some());
    }

    #[test]
    fn test_attribute_stringifies_numbers() {
        let record =
            JsonRecord::from_value(json!({"id": 42, "slug": "red-shoe", "tags": []})).unwrap();
        assert_eq!(record.attribute("slug").as_deref(), Some("red-shoe"));
        assert_eq!(record.id().as_deref(), Some("42"));
        assert_eq!(record.attribute("tags"), None);
        assert_eq!(record.attribute("missing"), None);
    }

    #[test]
    fn test_null_fields_are_declared() {
        let record = JsonRecord::from_value(json!({"image_count": null})).unwrap();
        assert!(record.has_field("image_count"));
        assert!(!record.has_field("specifications"));
    }

    #[tokio::test]
    async fn test_read_field_treats_null_as_unset() {
        let record = JsonRecord::from_value(json!({"image_count": null})).unwrap();
        assert!(record.read_field("image_count").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_fields_merges() {
        let record = JsonRecord::from_value(json!({"slug": "a", "image_count": 1})).unwrap();
        let mut fields = Map::new();
        fields.insert("image_count".to_string(), json!(2));
        fields.insert("updated_at".to_string(), json!("now"));
        record.update_fields(fields).await.unwrap();

        assert_eq!(record.get("image_count"), Some(json!(2)));
        assert_eq!(record.get("updated_at"), Some(json!("now")));
        assert_eq!(record.get("slug"), Some(json!("a")));
    }
}
