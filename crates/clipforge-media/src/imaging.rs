//! Image loading and rescaling for overlays.

use std::fs::File;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::error::{MediaError, MediaResult};

/// Fail with [`MediaError::FileNotFound`] unless `path` is a readable file.
pub fn check_file_exists(path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();
    let is_file = std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file || File::open(path).is_err() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Extensions FFmpeg can loop as a still image (`-loop 1`).
const LOOPABLE_STILL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Whether `path` must be re-encoded as PNG before FFmpeg can loop it.
/// GIF, BMP and TIFF go through other demuxers that reject `-loop`.
pub fn needs_png_conversion(path: impl AsRef<Path>) -> bool {
    let extension = path
        .as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    !LOOPABLE_STILL_EXTENSIONS.contains(&extension.as_str())
}

/// Decode `path` as RGBA. Animated formats yield their first frame.
pub fn load_rgba(path: impl AsRef<Path>) -> MediaResult<DynamicImage> {
    let path = path.as_ref();
    check_file_exists(path)?;
    let image = image::open(path)?;
    Ok(DynamicImage::ImageRgba8(image.to_rgba8()))
}

/// Width that keeps the aspect ratio of `width`x`height` at `target_height`.
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let scaled = (width as f64 * target_height as f64 / height as f64).round() as u32;
    scaled.max(1)
}

/// Load the image at `path` and resize it to `target_height`, keeping the
/// aspect ratio. Uses Lanczos resampling; the result is RGBA.
pub fn rescale_image(path: impl AsRef<Path>, target_height: u32) -> MediaResult<DynamicImage> {
    let path = path.as_ref();
    if target_height == 0 {
        return Err(MediaError::invalid_argument(format!(
            "target height for {} must be positive",
            path.display()
        )));
    }
    check_file_exists(path)?;

    let original = image::open(path)?;
    let (width, height) = original.dimensions();
    if height == 0 {
        return Err(MediaError::InvalidMedia(format!(
            "{} has zero height",
            path.display()
        )));
    }

    let resized = original.resize_exact(
        scaled_width(width, height, target_height),
        target_height,
        FilterType::Lanczos3,
    );
    Ok(DynamicImage::ImageRgba8(resized.to_rgba8()))
}
