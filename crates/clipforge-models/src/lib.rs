//! Shared data models for the clipforge media pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Overlay and segment descriptors consumed by the composition engine
//! - Encoding configuration
//! - Image asset records and upload inputs
//! - Collection and storage path constants

pub mod asset;
pub mod constants;
pub mod encoding;
pub mod media;

// Re-export common types
pub use asset::{
    validate_image_id, AssetValidationError, ImageMetadata, ImageRecord, ImageSource, ImageUpload,
};
pub use encoding::EncodingConfig;
pub use media::{
    AudioInput, HorizontalAnchor, HorizontalPosition, ImageInput, Position, VerticalAnchor,
    VerticalPosition, VideoInput,
};
