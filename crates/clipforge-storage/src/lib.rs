//! Blob storage for uploaded assets.
//!
//! This crate provides:
//! - The [`BlobStore`] trait used by the asset gateway
//! - An S3-compatible implementation (GCS interoperability, R2)
//! - Presigned URL generation
//! - An in-memory implementation for tests and mock runs

pub mod blob;
pub mod client;
pub mod error;
pub mod memory;

pub use blob::BlobStore;
pub use client::{S3BlobStore, S3Config};
pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryBlobStore, StoredObject};
