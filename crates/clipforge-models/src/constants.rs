//! Collection names, storage prefixes and upload rules.

/// Document store collections.
pub mod collections {
    pub const IMAGES: &str = "images";
}

/// Object key prefixes inside the bucket.
pub mod storage_paths {
    pub const IMAGES: &str = "images";
}

/// Accepted image extensions (lowercase, leading dot).
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] =
    &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tif", ".tiff"];

/// Number of random bytes behind a generated asset id (hex encoded).
pub const GENERATED_ID_BYTES: usize = 8;
