//! Where the image count lives on a record.
//!
//! Resolution order:
//! 1. the configured container field, if the record declares it, holding the
//!    count under the count attribute;
//! 2. the count attribute as a plain field;
//! 3. the legacy `specifications` container, key `image_count`;
//! 4. nowhere: reads yield 0 and writes do nothing.
//!
//! Every write also stamps `updated_at` in the same batch.

use crate::error::RecordError;
use crate::record::ImageRecord;
use chrono::Utc;
use serde_json::{Map, Value};
use webpshelf_core::constants::{LEGACY_COUNT_CONTAINER, LEGACY_COUNT_KEY, UPDATED_AT_FIELD};
use webpshelf_core::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountLocation {
    /// Count stored under `key` inside the JSON object in `field`.
    Container { field: String, key: String },
    /// Count stored directly in `field`.
    Direct { field: String },
    /// The record cannot hold a count.
    Unavailable,
}

impl CountLocation {
    pub fn resolve(config: &Config, record: &dyn ImageRecord) -> Self {
        if let Some(container) = config.count_container.as_deref() {
            if record.has_field(container) {
                return CountLocation::Container {
                    field: container.to_string(),
                    key: config.count_attribute.clone(),
                };
            }
        }

        if record.has_field(&config.count_attribute) {
            return CountLocation::Direct {
                field: config.count_attribute.clone(),
            };
        }

        if record.has_field(LEGACY_COUNT_CONTAINER) {
            return CountLocation::Container {
                field: LEGACY_COUNT_CONTAINER.to_string(),
                key: LEGACY_COUNT_KEY.to_string(),
            };
        }

        CountLocation::Unavailable
    }

    pub async fn read(&self, record: &dyn ImageRecord) -> Result<usize, RecordError> {
        match self {
            CountLocation::Container { field, key } => {
                let container = record.read_field(field).await?;
                match container {
                    Some(Value::Object(map)) => parse_count(field, map.get(key)),
                    Some(Value::Null) | None => Ok(0),
                    Some(other) => Err(not_an_object(field, &other)),
                }
            }
            CountLocation::Direct { field } => {
                let value = record.read_field(field).await?;
                parse_count(field, value.as_ref())
            }
            CountLocation::Unavailable => Ok(0),
        }
    }

    pub async fn write(&self, record: &dyn ImageRecord, count: usize) -> Result<(), RecordError> {
        let mut fields = Map::new();

        match self {
            CountLocation::Container { field, key } => {
                let mut container = match record.read_field(field).await? {
                    Some(Value::Object(map)) => map,
                    Some(Value::Null) | None => Map::new(),
                    Some(other) => return Err(not_an_object(field, &other)),
                };
                container.insert(key.clone(), Value::from(count));
                fields.insert(field.clone(), Value::Object(container));
            }
            CountLocation::Direct { field } => {
                fields.insert(field.clone(), Value::from(count));
            }
            CountLocation::Unavailable => return Ok(()),
        }

        fields.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        record.update_fields(fields).await
    }
}

fn parse_count(field: &str, value: Option<&Value>) -> Result<usize, RecordError> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| RecordError::InvalidValue {
                field: field.to_string(),
                message: format!("{} is not a non-negative integer", n),
            }),
        Some(other) => Err(RecordError::InvalidValue {
            field: field.to_string(),
            message: format!("expected an integer count, found {}", other),
        }),
    }
}

fn not_an_object(field: &str, value: &Value) -> RecordError {
    RecordError::InvalidValue {
        field: field.to_string(),
        message: format!("expected a JSON object, found {}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::JsonRecord;
    use serde_json::json;

    fn record(value: Value) -> JsonRecord {
        JsonRecord::from_value(value).unwrap()
    }

    fn container_config() -> Config {
        Config {
            count_container: Some("metadata".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_container_wins_when_configured_and_present() {
        let rec = record(json!({"metadata": {}, "image_count": 3}));
        assert_eq!(
            CountLocation::resolve(&container_config(), &rec),
            CountLocation::Container {
                field: "metadata".to_string(),
                key: "image_count".to_string()
            }
        );
    }

    #[test]
    fn test_direct_field_when_container_not_configured() {
        let rec = record(json!({"metadata": {}, "image_count": 3}));
        assert_eq!(
            CountLocation::resolve(&Config::default(), &rec),
            CountLocation::Direct {
                field: "image_count".to_string()
            }
        );
    }

    #[test]
    fn test_direct_field_when_container_missing_on_record() {
        let rec = record(json!({"image_count": 3}));
        assert_eq!(
            CountLocation::resolve(&container_config(), &rec),
            CountLocation::Direct {
                field: "image_count".to_string()
            }
        );
    }

    #[test]
    fn test_legacy_container_fallback() {
        let rec = record(json!({"specifications": {"image_count": 2}}));
        assert_eq!(
            CountLocation::resolve(&Config::default(), &rec),
            CountLocation::Container {
                field: "specifications".to_string(),
                key: "image_count".to_string()
            }
        );
    }

    #[test]
    fn test_unavailable_without_any_field() {
        let rec = record(json!({"slug": "a"}));
        assert_eq!(
            CountLocation::resolve(&Config::default(), &rec),
            CountLocation::Unavailable
        );
    }

    #[tokio::test]
    async fn test_read_container_count() {
        let rec = record(json!({"metadata": {"image_count": 4, "color": "red"}}));
        let location = CountLocation::resolve(&container_config(), &rec);
        assert_eq!(location.read(&rec).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_read_missing_values_as_zero() {
        let rec = record(json!({"metadata": null, "image_count": null}));
        let container = CountLocation::resolve(&container_config(), &rec);
        assert_eq!(container.read(&rec).await.unwrap(), 0);
        let direct = CountLocation::resolve(&Config::default(), &rec);
        assert_eq!(direct.read(&rec).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_rejects_negative_count() {
        let rec = record(json!({"image_count": -1}));
        let location = CountLocation::resolve(&Config::default(), &rec);
        assert!(matches!(
            location.read(&rec).await,
            Err(RecordError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_container_preserves_siblings() {
        let rec = record(json!({"metadata": {"color": "red"}, "image_count": 9}));
        let location = CountLocation::resolve(&container_config(), &rec);
        location.write(&rec, 5).await.unwrap();

        assert_eq!(
            rec.get("metadata"),
            Some(json!({"color": "red", "image_count": 5}))
        );
        assert_eq!(rec.get("image_count"), Some(json!(9)));
        assert!(rec.get("updated_at").is_some());
    }

    #[tokio::test]
    async fn test_write_direct_field() {
        let rec = record(json!({"image_count": 1}));
        let location = CountLocation::resolve(&Config::default(), &rec);
        location.write(&rec, 2).await.unwrap();
        assert_eq!(rec.get("image_count"), Some(json!(2)));
        assert!(rec.get("updated_at").is_some());
    }

    #[tokio::test]
    async fn test_write_legacy_container_from_null() {
        let rec = record(json!({"specifications": null}));
        let location = CountLocation::resolve(&Config::default(), &rec);
        location.write(&rec, 1).await.unwrap();
        assert_eq!(rec.get("specifications"), Some(json!({"image_count": 1})));
    }

    #[tokio::test]
    async fn test_write_unavailable_is_noop() {
        let rec = record(json!({"slug": "a"}));
        let location = CountLocation::resolve(&Config::default(), &rec);
        location.write(&rec, 7).await.unwrap();
        assert_eq!(rec.snapshot(), json!({"slug": "a"}).as_object().unwrap().clone());
        assert_eq!(location.read(&rec).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_write_rejects_non_object_container() {
        let rec = record(json!({"specifications": "n/a"}));
        let location = CountLocation::resolve(&Config::default(), &rec);
        assert!(location.write(&rec, 1).await.is_err());
    }
}
