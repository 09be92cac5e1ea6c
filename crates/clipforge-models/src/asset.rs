//! Image asset records and upload inputs.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::constants::{storage_paths, ALLOWED_IMAGE_EXTENSIONS, GENERATED_ID_BYTES};

/// Validation failures raised while building asset inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetValidationError {
    #[error("Invalid image type: {0}")]
    InvalidImageType(String),

    #[error("Unknown image source: {0}")]
    UnknownSource(String),

    #[error("Image id cannot be empty")]
    EmptyId,

    #[error("Image id {0:?} may only contain ASCII letters, digits, '_' and '-'")]
    InvalidId(String),
}

/// Check an image id: non-empty, `[A-Za-z0-9_-]` only. The same id names the
/// stored object and the metadata document.
pub fn validate_image_id(id: &str) -> Result<(), AssetValidationError> {
    if id.trim().is_empty() {
        return Err(AssetValidationError::EmptyId);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AssetValidationError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ImageSource {
    Brand,
    Imagen,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Brand => "Brand",
            ImageSource::Imagen => "Imagen",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageSource {
    type Err = AssetValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Brand" => Ok(ImageSource::Brand),
            "Imagen" => Ok(ImageSource::Imagen),
            other => Err(AssetValidationError::UnknownSource(other.to_string())),
        }
    }
}

/// Generate a random asset id (16 lowercase hex characters).
pub fn generate_asset_id() -> String {
    let uuid = Uuid::new_v4();
    uuid.as_bytes()[..GENERATED_ID_BYTES]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Lowercased extension of `filename` including the leading dot, or an
/// empty string when there is none.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// An image upload request, validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Filename as supplied by the client.
    pub original_file_name: String,
    pub source: ImageSource,
    /// Owning session, `None` for a global asset.
    pub session_id: Option<String>,
    pub image_name: Option<String>,
    pub context: Option<String>,
    /// Document id; generated unless supplied.
    pub image_id: String,
}

impl ImageUpload {
    /// Build an upload, rejecting filenames outside the extension allow-list.
    pub fn new(
        bytes: Vec<u8>,
        original_file_name: impl Into<String>,
        source: ImageSource,
    ) -> Result<Self, AssetValidationError> {
        let upload = Self {
            bytes,
            original_file_name: original_file_name.into(),
            source,
            session_id: None,
            image_name: None,
            context: None,
            image_id: generate_asset_id(),
        };
        upload.validate()?;
        Ok(upload)
    }

    /// Check the extension allow-list and the id.
    pub fn validate(&self) -> Result<(), AssetValidationError> {
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&self.file_extension().as_str()) {
            return Err(AssetValidationError::InvalidImageType(
                self.original_file_name.clone(),
            ));
        }
        validate_image_id(&self.image_id)
    }

    pub fn with_image_id(mut self, id: impl Into<String>) -> Result<Self, AssetValidationError> {
        let id = id.into();
        validate_image_id(&id)?;
        self.image_id = id;
        Ok(self)
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.image_name = Some(name.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Lowercased extension of the original filename, with leading dot.
    pub fn file_extension(&self) -> String {
        file_extension(&self.original_file_name)
    }

    /// Stored object name: `<id><ext>`.
    pub fn stored_file_name(&self) -> String {
        format!("{}{}", self.image_id, self.file_extension())
    }

    /// Object key inside the bucket: `images/<id><ext>`.
    pub fn object_path(&self) -> String {
        format!("{}/{}", storage_paths::IMAGES, self.stored_file_name())
    }
}

/// Metadata document persisted for every uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageRecord {
    pub bucket_name: String,
    /// Object key inside the bucket.
    pub file_path: String,
    /// Stored object name.
    pub file_name: String,
    pub original_file_name: String,
    /// Fully qualified URI, e.g. `gs://bucket/images/abc.png`.
    pub full_storage_path: String,
    pub source: ImageSource,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl ImageRecord {
    /// Describe where `upload` lands in `bucket`.
    pub fn for_upload(upload: &ImageUpload, bucket: &str, uri_scheme: &str) -> Self {
        let file_path = upload.object_path();
        Self {
            bucket_name: bucket.to_string(),
            full_storage_path: format!("{}://{}/{}", uri_scheme, bucket, file_path),
            file_path,
            file_name: upload.stored_file_name(),
            original_file_name: upload.original_file_name.clone(),
            source: upload.source,
            image_name: upload.image_name.clone(),
            context: upload.context.clone(),
            date_created: Utc::now(),
        }
    }
}

/// An image record decorated with a time-limited access URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageMetadata {
    #[serde(flatten)]
    pub record: ImageRecord,
    #[serde(default)]
    pub signed_url: String,
}

impl ImageMetadata {
    pub fn new(record: ImageRecord, signed_url: impl Into<String>) -> Self {
        Self {
            record,
            signed_url: signed_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_16_hex_chars() {
        let id = generate_asset_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, generate_asset_id());
    }

    #[test]
    fn test_extension_allow_list_is_case_insensitive() {
        let upload = ImageUpload::new(vec![1, 2, 3], "Logo.PNG", ImageSource::Brand).unwrap();
        assert_eq!(upload.file_extension(), ".png");

        for name in ["a.jpg", "b.jpeg", "c.gif", "d.bmp", "e.tif", "f.TIFF"] {
            assert!(ImageUpload::new(vec![], name, ImageSource::Imagen).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_disallowed_extensions_rejected() {
        for name in ["clip.mp4", "noext", ".png", "script.png.exe"] {
            let err = ImageUpload::new(vec![], name, ImageSource::Brand).unwrap_err();
            assert_eq!(err, AssetValidationError::InvalidImageType(name.to_string()));
        }
    }

    #[test]
    fn test_object_path_uses_id_and_extension() {
        let upload = ImageUpload::new(vec![], "photo.JPG", ImageSource::Brand)
            .unwrap()
            .with_image_id("test_id")
            .unwrap();
        assert_eq!(upload.stored_file_name(), "test_id.jpg");
        assert_eq!(upload.object_path(), "images/test_id.jpg");
    }

    #[test]
    fn test_validate_catches_edited_fields() {
        let mut upload = ImageUpload::new(vec![], "a.png", ImageSource::Brand).unwrap();
        assert!(upload.validate().is_ok());
        upload.original_file_name = "a.svg".to_string();
        assert_eq!(
            upload.validate().unwrap_err(),
            AssetValidationError::InvalidImageType("a.svg".to_string())
        );
    }

    #[test]
    fn test_empty_supplied_id_rejected() {
        let upload = ImageUpload::new(vec![], "a.png", ImageSource::Brand).unwrap();
        assert_eq!(upload.with_image_id("  ").unwrap_err(), AssetValidationError::EmptyId);
    }

    #[test]
    fn test_supplied_id_with_reserved_characters_rejected() {
        for bad in ["logo#1", "a/b", "x?y", "p&q", "with space", "caf\u{e9}"] {
            let err = ImageUpload::new(vec![], "a.png", ImageSource::Brand)
                .unwrap()
                .with_image_id(bad)
                .unwrap_err();
            assert_eq!(err, AssetValidationError::InvalidId(bad.to_string()));
        }

        let ok = ImageUpload::new(vec![], "a.png", ImageSource::Brand)
            .unwrap()
            .with_image_id("Logo_v2-final")
            .unwrap();
        assert_eq!(ok.object_path(), "images/Logo_v2-final.png");
    }

    #[test]
    fn test_validate_catches_edited_id() {
        let mut upload = ImageUpload::new(vec![], "a.png", ImageSource::Brand).unwrap();
        upload.image_id = "logo#1".to_string();
        assert!(matches!(
            upload.validate(),
            Err(AssetValidationError::InvalidId(_))
        ));
    }

    #[test]
    fn test_record_for_upload() {
        let upload = ImageUpload::new(b"fake image content".to_vec(), "test_image.jpg", ImageSource::Brand)
            .unwrap()
            .with_image_id("abc")
            .unwrap()
            .with_name("Test Image")
            .with_context("Test Context");

        let record = ImageRecord::for_upload(&upload, "my-bucket", "gs");
        assert_eq!(record.bucket_name, "my-bucket");
        assert_eq!(record.file_path, "images/abc.jpg");
        assert_eq!(record.file_name, "abc.jpg");
        assert_eq!(record.original_file_name, "test_image.jpg");
        assert_eq!(record.full_storage_path, "gs://my-bucket/images/abc.jpg");
        assert_eq!(record.image_name.as_deref(), Some("Test Image"));
        assert_eq!(record.context.as_deref(), Some("Test Context"));
    }

    #[test]
    fn test_source_round_trips_through_str() {
        assert_eq!("Brand".parse::<ImageSource>().unwrap(), ImageSource::Brand);
        assert_eq!(ImageSource::Imagen.to_string(), "Imagen");
        assert!("brand".parse::<ImageSource>().is_err());
    }

    #[test]
    fn test_metadata_serializes_flat() {
        let upload = ImageUpload::new(vec![], "a.png", ImageSource::Brand).unwrap();
        let metadata = ImageMetadata::new(
            ImageRecord::for_upload(&upload, "bucket", "gs"),
            "https://signed.example/a.png",
        );
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["bucket_name"], "bucket");
        assert_eq!(json["signed_url"], "https://signed.example/a.png");
        assert_eq!(json["source"], "Brand");
    }
}
