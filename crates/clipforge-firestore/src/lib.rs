//! Firestore REST API client.
//!
//! This crate provides:
//! - The [`DocumentStore`] trait used by the asset gateway
//! - A REST client with service account authentication via gcp_auth
//! - An in-memory store for tests and mock runs
//! - A typed repository for image metadata documents

pub mod client;
pub mod error;
pub mod image_repo;
pub mod memory;
pub mod metrics;
pub mod store;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use image_repo::ImageRepository;
pub use memory::InMemoryDocumentStore;
pub use store::DocumentStore;
pub use types::{Document, Fields, FromFirestoreValue, ToFirestoreValue, Value};
