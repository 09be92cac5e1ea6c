//! In-process blob store for tests and local runs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::blob::{validate_key, BlobStore};
use crate::error::{StorageError, StorageResult};

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Blob store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the object at `bucket`/`path`, if any.
    pub async fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Number of stored objects across all buckets.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn write(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        validate_key(path)?;
        self.objects.write().await.insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(path)?;
        Ok(format!(
            "memory://{}/{}?expires_in={}",
            bucket,
            path,
            expires_in.as_secs()
        ))
    }

    async fn read(&self, bucket: &str, path: &str) -> StorageResult<Vec<u8>> {
        validate_key(path)?;
        self.get(bucket, path)
            .await
            .map(|object| object.data)
            .ok_or_else(|| StorageError::not_found(bucket, path))
    }

    async fn exists(&self, bucket: &str, path: &str) -> StorageResult<bool> {
        validate_key(path)?;
        Ok(self.get(bucket, path).await.is_some())
    }
}
