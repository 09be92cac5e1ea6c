//! The asset gateway interface and its construction.

use std::sync::Arc;

use async_trait::async_trait;
use clipforge_firestore::{DocumentStore, FirestoreClient};
use clipforge_models::{ImageMetadata, ImageSource, ImageUpload};
use clipforge_storage::{BlobStore, S3BlobStore};
use tracing::info;

use crate::cloud::CloudAssetService;
use crate::config::AssetsConfig;
use crate::error::AssetResult;
use crate::mock::MockAssetService;

/// Persist uploaded images and hand back their metadata.
#[async_trait]
pub trait AssetService: Send + Sync {
    /// Store the upload and its metadata record. Returns the image id.
    async fn upload_image_asset(&self, upload: ImageUpload) -> AssetResult<String>;

    /// Metadata for `image_id` with a fresh signed URL, or `None` when no
    /// record exists.
    async fn get_image_metadata_with_signed_url(
        &self,
        image_id: &str,
    ) -> AssetResult<Option<ImageMetadata>>;

    /// Metadata for every image from `source`, each with a signed URL.
    async fn list_images_by_source(&self, source: ImageSource) -> AssetResult<Vec<ImageMetadata>>;
}

/// Pick the implementation selected by `config.use_mocks`.
///
/// The stores are ignored in mock mode.
pub fn build_asset_service(
    config: AssetsConfig,
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
) -> Arc<dyn AssetService> {
    if config.use_mocks {
        info!("Asset gateway running with mock data");
        Arc::new(MockAssetService::new())
    } else {
        info!(bucket = %config.bucket_name, "Asset gateway using cloud stores");
        Arc::new(CloudAssetService::new(config, blobs, documents))
    }
}

/// Build the gateway from environment variables.
///
/// Store clients are only constructed when mocks are off, so mock runs need
/// no credentials.
pub fn asset_service_from_env() -> AssetResult<Arc<dyn AssetService>> {
    let config = AssetsConfig::from_env();
    if config.use_mocks {
        return Ok(Arc::new(MockAssetService::new()));
    }

    let blobs: Arc<dyn BlobStore> = Arc::new(S3BlobStore::from_env()?);
    let documents: Arc<dyn DocumentStore> = Arc::new(FirestoreClient::from_env()?);
    Ok(build_asset_service(config, blobs, documents))
}
