//! Repository for image metadata documents.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clipforge_models::constants::collections;
use clipforge_models::{ImageRecord, ImageSource};
use tracing::{info, warn};

use crate::error::{FirestoreError, FirestoreResult};
use crate::store::DocumentStore;
use crate::types::{Fields, FromFirestoreValue, ToFirestoreValue};

/// Document field holding the fully qualified object URI. Kept under its
/// historical name so existing image documents stay readable.
pub const FULL_STORAGE_PATH_FIELD: &str = "full_gcs_path";

/// Repository for documents in the `images` collection.
#[derive(Clone)]
pub struct ImageRepository {
    store: Arc<dyn DocumentStore>,
}

impl ImageRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist `record` under `image_id` and return the stored id.
    pub async fn create(&self, image_id: &str, record: &ImageRecord) -> FirestoreResult<String> {
        let id = self
            .store
            .create(collections::IMAGES, image_id, image_record_to_fields(record))
            .await?;
        info!(image_id = %id, source = %record.source, "Created image document");
        Ok(id)
    }

    /// Fetch the record stored under `image_id`.
    pub async fn get(&self, image_id: &str) -> FirestoreResult<Option<ImageRecord>> {
        match self.store.get(collections::IMAGES, image_id).await? {
            Some(fields) => Ok(Some(fields_to_image_record(&fields)?)),
            None => Ok(None),
        }
    }

    /// All records whose source is `source`, as `(id, record)` pairs.
    /// Documents that fail to parse are skipped.
    pub async fn list_by_source(
        &self,
        source: ImageSource,
    ) -> FirestoreResult<Vec<(String, ImageRecord)>> {
        let docs = self
            .store
            .query_eq(collections::IMAGES, "source", source.as_str().to_firestore_value())
            .await?;

        let mut records = Vec::with_capacity(docs.len());
        for (id, fields) in docs {
            match fields_to_image_record(&fields) {
                Ok(record) => records.push((id, record)),
                Err(e) => warn!(image_id = %id, "Skipping unreadable image document: {}", e),
            }
        }
        Ok(records)
    }
}

/// Firestore fields for an image record.
pub fn image_record_to_fields(record: &ImageRecord) -> Fields {
    let mut fields = Fields::new();
    fields.insert("bucket_name".to_string(), record.bucket_name.to_firestore_value());
    fields.insert("file_path".to_string(), record.file_path.to_firestore_value());
    fields.insert("file_name".to_string(), record.file_name.to_firestore_value());
    fields.insert(
        "original_file_name".to_string(),
        record.original_file_name.to_firestore_value(),
    );
    fields.insert(
        FULL_STORAGE_PATH_FIELD.to_string(),
        record.full_storage_path.to_firestore_value(),
    );
    fields.insert("source".to_string(), record.source.as_str().to_firestore_value());
    fields.insert("image_name".to_string(), record.image_name.to_firestore_value());
    fields.insert("context".to_string(), record.context.to_firestore_value());
    fields.insert("date_created".to_string(), record.date_created.to_firestore_value());
    fields
}

/// Parse an image record from Firestore fields.
pub fn fields_to_image_record(fields: &Fields) -> FirestoreResult<ImageRecord> {
    let required = |key: &str| -> FirestoreResult<String> {
        fields
            .get(key)
            .and_then(String::from_firestore_value)
            .ok_or_else(|| FirestoreError::InvalidResponse(format!("missing field {}", key)))
    };
    let optional = |key: &str| fields.get(key).and_then(String::from_firestore_value);

    let source = required("source")?
        .parse::<ImageSource>()
        .map_err(|e| FirestoreError::InvalidResponse(e.to_string()))?;
    let date_created = fields
        .get("date_created")
        .and_then(DateTime::<Utc>::from_firestore_value)
        .ok_or_else(|| FirestoreError::InvalidResponse("missing field date_created".to_string()))?;

    Ok(ImageRecord {
        bucket_name: required("bucket_name")?,
        file_path: required("file_path")?,
        file_name: required("file_name")?,
        original_file_name: required("original_file_name")?,
        full_storage_path: required(FULL_STORAGE_PATH_FIELD)?,
        source,
        image_name: optional("image_name"),
        context: optional("context"),
        date_created,
    })
}
