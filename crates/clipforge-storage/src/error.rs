//! Storage error types.

use std::fmt::Display;

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from blob store operations, addressed by bucket and object path.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is not configured: {0}")]
    Config(String),

    #[error("No object at {bucket}/{path}")]
    NotFound { bucket: String, path: String },

    #[error("Writing {bucket}/{path} failed: {message}")]
    WriteFailed {
        bucket: String,
        path: String,
        message: String,
    },

    #[error("Reading {bucket}/{path} failed: {message}")]
    ReadFailed {
        bucket: String,
        path: String,
        message: String,
    },

    #[error("Signing a URL for {bucket}/{path} failed: {message}")]
    SignFailed {
        bucket: String,
        path: String,
        message: String,
    },

    #[error("Object key {0:?} must be non-empty and relative")]
    InvalidKey(String),
}

impl StorageError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(bucket: &str, path: &str) -> Self {
        Self::NotFound {
            bucket: bucket.to_string(),
            path: path.to_string(),
        }
    }

    pub fn write_failed(bucket: &str, path: &str, err: impl Display) -> Self {
        Self::WriteFailed {
            bucket: bucket.to_string(),
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn read_failed(bucket: &str, path: &str, err: impl Display) -> Self {
        Self::ReadFailed {
            bucket: bucket.to_string(),
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn sign_failed(bucket: &str, path: &str, err: impl Display) -> Self {
        Self::SignFailed {
            bucket: bucket.to_string(),
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
