//! Gateway backed by a blob store and a document store.

use std::sync::Arc;

use async_trait::async_trait;
use clipforge_firestore::{DocumentStore, ImageRepository};
use clipforge_models::{ImageMetadata, ImageRecord, ImageSource, ImageUpload};
use clipforge_storage::BlobStore;
use tracing::{debug, info};

use crate::config::AssetsConfig;
use crate::error::AssetResult;
use crate::service::AssetService;

/// Content type stored with an image object, from its extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Writes image bytes to the blob store and records to `images`.
#[derive(Clone)]
pub struct CloudAssetService {
    config: AssetsConfig,
    blobs: Arc<dyn BlobStore>,
    images: ImageRepository,
}

impl CloudAssetService {
    pub fn new(
        config: AssetsConfig,
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config,
            blobs,
            images: ImageRepository::new(documents),
        }
    }

    pub fn config(&self) -> &AssetsConfig {
        &self.config
    }

    async fn with_signed_url(&self, record: ImageRecord) -> AssetResult<ImageMetadata> {
        let url = self
            .blobs
            .signed_url(&record.bucket_name, &record.file_path, self.config.signed_url_ttl)
            .await?;
        Ok(ImageMetadata::new(record, url))
    }
}

#[async_trait]
impl AssetService for CloudAssetService {
    async fn upload_image_asset(&self, upload: ImageUpload) -> AssetResult<String> {
        upload.validate()?;

        let bucket = &self.config.bucket_name;
        let record = ImageRecord::for_upload(&upload, bucket, &self.config.uri_scheme);
        let size = upload.bytes.len();
        let content_type = content_type_for(&upload.file_extension());

        self.blobs
            .write(bucket, &record.file_path, upload.bytes, content_type)
            .await?;
        debug!(bucket = %bucket, path = %record.file_path, size, "Stored image bytes");

        let id = self.images.create(&upload.image_id, &record).await?;

        info!(
            image_id = %id,
            source = %record.source,
            session_id = upload.session_id.as_deref().unwrap_or(""),
            path = %record.full_storage_path,
            "Uploaded image asset"
        );
        Ok(id)
    }

    async fn get_image_metadata_with_signed_url(
        &self,
        image_id: &str,
    ) -> AssetResult<Option<ImageMetadata>> {
        let Some(record) = self.images.get(image_id).await? else {
            debug!(image_id, "Image record not found");
            return Ok(None);
        };
        Ok(Some(self.with_signed_url(record).await?))
    }

    async fn list_images_by_source(&self, source: ImageSource) -> AssetResult<Vec<ImageMetadata>> {
        let records = self.images.list_by_source(source).await?;
        let mut out = Vec::with_capacity(records.len());
        for (_, record) in records {
            out.push(self.with_signed_url(record).await?);
        }
        info!(source = %source, count = out.len(), "Listed image assets");
        Ok(out)
    }
}
