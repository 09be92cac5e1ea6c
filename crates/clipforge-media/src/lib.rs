//! FFmpeg CLI wrapper for video composition.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation and timeout support via tokio
//! - Image overlays, segment concatenation and audio mixing
//! - Media probing and image rescaling helpers

pub mod audio;
pub mod command;
pub mod compositor;
pub mod concat;
pub mod error;
pub mod filters;
pub mod imaging;
pub mod overlay;
pub mod probe;
pub mod progress;
mod render;

use std::path::{Path, PathBuf};

pub use clipforge_models::{AudioInput, EncodingConfig, ImageInput, VideoInput};

pub use audio::{calculate_audio_duration, load_audio_clips, AudioClip};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegInput, FfmpegRunner};
pub use compositor::Compositor;
pub use error::{MediaError, MediaResult};
pub use imaging::{check_file_exists, load_rgba, rescale_image};
pub use overlay::effective_overlay_duration;
pub use probe::{get_duration, probe_media, MediaInfo};
pub use progress::FfmpegProgress;

/// Overlay images on `base` with a default [`Compositor`].
pub async fn add_image_clips_to_video(
    base: impl AsRef<Path>,
    image_inputs: &[ImageInput],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    Compositor::new()
        .add_image_clips_to_video(base, image_inputs, output, encoding)
        .await
}

/// Concatenate segments with a default [`Compositor`].
pub async fn concatenate_video_clips(
    video_inputs: &[VideoInput],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    Compositor::new()
        .concatenate_video_clips(video_inputs, output, encoding)
        .await
}

/// Mix audio clips onto `base` with a default [`Compositor`].
pub async fn add_audio_clips_to_video(
    base: impl AsRef<Path>,
    audio_inputs: &[AudioInput],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    Compositor::new()
        .add_audio_clips_to_video(base, audio_inputs, output, encoding)
        .await
}
