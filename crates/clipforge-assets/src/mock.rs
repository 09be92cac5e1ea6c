//! Canned gateway used when `USE_MOCKS` is set.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use clipforge_models::{ImageMetadata, ImageRecord, ImageSource, ImageUpload};
use tracing::debug;

use crate::error::AssetResult;
use crate::service::AssetService;

/// Image id for which the mock reports no record.
pub const MOCK_NOT_FOUND_ID: &str = "not_found";

/// Metadata returned for every mock lookup.
pub fn mock_image_metadata() -> ImageMetadata {
    let record = ImageRecord {
        bucket_name: "mock-bucket".to_string(),
        file_path: "images/mock_image.jpg".to_string(),
        file_name: "mock_image.jpg".to_string(),
        original_file_name: "original_mock.jpg".to_string(),
        full_storage_path: "gs://mock-bucket/images/mock_image.jpg".to_string(),
        source: ImageSource::Brand,
        image_name: Some("Mock Image".to_string()),
        context: Some("Mock Context".to_string()),
        date_created: Utc
            .with_ymd_and_hms(2025, 1, 1, 10, 0, 0)
            .single()
            .unwrap_or_default(),
    };
    ImageMetadata::new(record, "/assets/gen-v-logo.png")
}

/// Gateway that touches no store.
#[derive(Debug, Clone, Default)]
pub struct MockAssetService;

impl MockAssetService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetService for MockAssetService {
    async fn upload_image_asset(&self, upload: ImageUpload) -> AssetResult<String> {
        debug!(image_id = %upload.image_id, "Mock upload");
        Ok(upload.image_id)
    }

    async fn get_image_metadata_with_signed_url(
        &self,
        image_id: &str,
    ) -> AssetResult<Option<ImageMetadata>> {
        if image_id == MOCK_NOT_FOUND_ID {
            return Ok(None);
        }
        Ok(Some(mock_image_metadata()))
    }

    async fn list_images_by_source(&self, _source: ImageSource) -> AssetResult<Vec<ImageMetadata>> {
        Ok(vec![mock_image_metadata()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_supplied_id() {
        let upload = ImageUpload::new(vec![1, 2, 3], "a.gif", ImageSource::Imagen)
            .unwrap()
            .with_image_id("given-id")
            .unwrap();
        let id = MockAssetService::new().upload_image_asset(upload).await.unwrap();
        assert_eq!(id, "given-id");
    }

    #[tokio::test]
    async fn test_canned_metadata() {
        let service = MockAssetService::new();
        let metadata = service
            .get_image_metadata_with_signed_url("anything")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(metadata.record.bucket_name, "mock-bucket");
        assert_eq!(metadata.record.source, ImageSource::Brand);
        assert_eq!(metadata.signed_url, "/assets/gen-v-logo.png");
        assert_eq!(metadata.record.date_created.to_rfc3339(), "2025-01-01T10:00:00+00:00");

        assert!(service
            .get_image_metadata_with_signed_url(MOCK_NOT_FOUND_ID)
            .await
            .unwrap()
            .is_none());
    }
}
