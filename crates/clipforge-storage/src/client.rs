//! S3-compatible blob store (GCS interoperability endpoint, R2, MinIO).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::blob::{validate_key, BlobStore};
use crate::error::{StorageError, StorageResult};

/// Default endpoint: Cloud Storage XML API with HMAC keys.
pub const DEFAULT_ENDPOINT_URL: &str = "https://storage.googleapis.com";

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region ("auto" works for GCS and R2)
    pub region: String,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT_URL.to_string()),
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config("STORAGE_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Blob store backed by an S3-compatible API.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    /// Create a new client from configuration.
    pub fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "clipforge",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(S3Config::from_env()?))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn write(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        validate_key(path)?;
        let size = data.len();
        debug!("Uploading {} bytes to {}/{}", size, bucket, path);

        self.client
            .put_object()
            .bucket(bucket)
            .key(path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::write_failed(bucket, path, e))?;

        info!(bucket, path, size, "Uploaded object");
        Ok(())
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(path)?;
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::sign_failed(bucket, path, e))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::sign_failed(bucket, path, e))?;

        Ok(presigned.uri().to_string())
    }

    async fn read(&self, bucket: &str, path: &str) -> StorageResult<Vec<u8>> {
        validate_key(path)?;
        debug!("Downloading {}/{}", bucket, path);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(err) if err.is_no_such_key() => StorageError::not_found(bucket, path),
                _ => StorageError::read_failed(bucket, path, &e),
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::read_failed(bucket, path, e))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    async fn exists(&self, bucket: &str, path: &str) -> StorageResult<bool> {
        validate_key(path)?;
        match self.client.head_object().bucket(bucket).key(path).send().await {
            Ok(_) => Ok(true),
            Err(e) => match e.as_service_error() {
                Some(err) if err.is_not_found() => Ok(false),
                _ => Err(StorageError::read_failed(bucket, path, &e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn local_config() -> S3Config {
        S3Config {
            endpoint_url: "http://127.0.0.1:9000".to_string(),
            access_key_id: "test-access".to_string(),
            secret_access_key: "test-secret".to_string(),
            region: "auto".to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("STORAGE_ACCESS_KEY_ID", "key");
        std::env::set_var("STORAGE_SECRET_ACCESS_KEY", "secret");
        std::env::remove_var("STORAGE_ENDPOINT_URL");
        std::env::remove_var("STORAGE_REGION");

        let config = S3Config::from_env().unwrap();
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
        assert_eq!(config.region, "auto");
        assert_eq!(config.access_key_id, "key");

        std::env::remove_var("STORAGE_ACCESS_KEY_ID");
        std::env::remove_var("STORAGE_SECRET_ACCESS_KEY");
    }

    #[test]
    #[serial]
    fn test_config_requires_credentials() {
        std::env::remove_var("STORAGE_ACCESS_KEY_ID");
        let err = S3Config::from_env().unwrap_err();
        assert!(matches!(err, StorageError::Config(_)));
    }

    #[tokio::test]
    async fn test_signed_url_is_generated_locally() {
        let store = S3BlobStore::new(local_config());
        let url = store
            .signed_url("assets", "images/abc.png", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("http://127.0.0.1:9000/assets/images/abc.png?"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let store = S3BlobStore::new(local_config());
        let err = store
            .signed_url("assets", "", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
