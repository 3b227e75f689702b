use serde::Deserialize;

/// Object-created notification as delivered by S3 to Lambda.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageRecord {
    pub s3: S3Entity,
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Location of the uploaded image, as handed to the OCR provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
}

impl ImageRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        ImageRef {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn from_record(record: &StorageRecord) -> Self {
        ImageRef::new(record.s3.bucket.name.clone(), record.s3.object.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_s3_notification() {
        let raw = r#"{
            "Records": [{
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "receipts", "arn": "arn:aws:s3:::receipts" },
                    "object": { "key": "alice-receipt123.png", "size": 48213 }
                }
            }]
        }"#;

        let event: StorageEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.records.len(), 1);

        let record = &event.records[0];
        assert_eq!(record.event_name.as_deref(), Some("ObjectCreated:Put"));
        assert_eq!(record.s3.object.size, Some(48213));
        assert_eq!(
            ImageRef::from_record(record),
            ImageRef::new("receipts", "alice-receipt123.png")
        );
    }

    #[test]
    fn minimal_record_without_optional_fields() {
        let raw = r#"{"Records":[{"s3":{"bucket":{"name":"b"},"object":{"key":"k"}}}]}"#;
        let event: StorageEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.records[0].event_name, None);
        assert_eq!(event.records[0].s3.object.size, None);
    }

    #[test]
    fn missing_records_is_empty() {
        let event: StorageEvent = serde_json::from_str("{}").unwrap();
        assert!(event.records.is_empty());
    }
}
