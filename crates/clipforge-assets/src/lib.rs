//! Image asset gateway.
//!
//! This crate provides:
//! - The [`AssetService`] trait for uploading images and reading their metadata
//! - A cloud implementation over [`clipforge_storage::BlobStore`] and
//!   [`clipforge_firestore::DocumentStore`]
//! - A mock implementation selected by [`AssetsConfig::use_mocks`]

pub mod cloud;
pub mod config;
pub mod error;
pub mod mock;
pub mod service;

pub use clipforge_models::{ImageMetadata, ImageRecord, ImageSource, ImageUpload};

pub use cloud::{content_type_for, CloudAssetService};
pub use config::AssetsConfig;
pub use error::{AssetError, AssetResult};
pub use mock::{mock_image_metadata, MockAssetService};
pub use service::{asset_service_from_env, build_asset_service, AssetService};
