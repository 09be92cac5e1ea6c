//! Blob store abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Object storage addressed by bucket and object path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path`, replacing any existing object.
    async fn write(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Time-limited GET URL for `path`.
    async fn signed_url(&self, bucket: &str, path: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Read the object at `path`.
    async fn read(&self, bucket: &str, path: &str) -> StorageResult<Vec<u8>>;

    /// Whether an object exists at `path`.
    async fn exists(&self, bucket: &str, path: &str) -> StorageResult<bool>;
}

/// Reject keys that are empty or start with `/`.
pub(crate) fn validate_key(path: &str) -> StorageResult<()> {
    if path.is_empty() || path.starts_with('/') {
        return Err(crate::error::StorageError::InvalidKey(path.to_string()));
    }
    Ok(())
}
