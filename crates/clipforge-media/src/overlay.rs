//! Image overlays on top of a base video.

use std::path::{Path, PathBuf};

use clipforge_models::{EncodingConfig, ImageInput};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegInput};
use crate::compositor::Compositor;
use crate::error::{MediaError, MediaResult};
use crate::filters::overlay_chain;
use crate::imaging::{check_file_exists, load_rgba, needs_png_conversion, rescale_image};
use crate::probe::probe_media;
use crate::render::render_atomically;

/// An overlay ready to be placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedOverlay {
    /// Image file fed to FFmpeg (a rescaled copy when a height was requested)
    pub path: PathBuf,
    pub input: ImageInput,
    /// Seconds on screen, never shorter than one frame
    pub duration: f64,
}

/// Seconds an overlay stays on screen.
///
/// Absent durations follow the base video. Anything shorter than one frame
/// is widened to a single frame so the overlay still renders.
pub fn effective_overlay_duration(
    requested: Option<f64>,
    base_duration: f64,
    fps: f64,
) -> MediaResult<f64> {
    let duration = requested.unwrap_or(base_duration);
    if duration < 0.0 || !duration.is_finite() {
        return Err(MediaError::invalid_argument(format!(
            "overlay duration must be a non-negative number, got {}",
            duration
        )));
    }
    Ok(duration.max(1.0 / fps))
}

fn validate_image_inputs(image_inputs: &[ImageInput]) -> MediaResult<()> {
    if image_inputs.is_empty() {
        return Err(MediaError::invalid_argument(
            "at least one image overlay is required",
        ));
    }
    for input in image_inputs {
        if let Some(d) = input.duration {
            if d < 0.0 || !d.is_finite() {
                return Err(MediaError::invalid_argument(format!(
                    "overlay {} has negative duration {}",
                    input.path.display(),
                    d
                )));
            }
        }
        if input.height == Some(0) {
            return Err(MediaError::invalid_argument(format!(
                "overlay {} has zero target height",
                input.path.display()
            )));
        }
    }
    Ok(())
}

/// Write `source` as PNG to `dest`, rescaled to `height` when given.
async fn write_png_still(
    source: &Path,
    height: Option<u32>,
    dest: PathBuf,
) -> MediaResult<PathBuf> {
    let source = source.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let image = match height {
            Some(height) => rescale_image(&source, height)?,
            None => load_rgba(&source)?,
        };
        image.save_with_format(&dest, image::ImageFormat::Png)?;
        Ok::<_, MediaError>(dest)
    })
    .await
    .map_err(|e| MediaError::internal(format!("rescale task failed: {}", e)))?
}

/// Build the overlay command: base on input 0, one looped image per overlay.
pub(crate) fn build_overlay_command(
    base: &Path,
    overlays: &[ResolvedOverlay],
    base_duration: f64,
    fps: f64,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output).input_file(base);
    let mut chains = Vec::with_capacity(overlays.len());
    let mut previous = "0:v".to_string();

    for (i, overlay) in overlays.iter().enumerate() {
        let index = i + 1;
        cmd = cmd.input(FfmpegInput::looped_image(&overlay.path, fps, overlay.duration));

        let label = format!("ov{}", index);
        chains.push(overlay_chain(
            &previous,
            &format!("{}:v", index),
            overlay.input.position,
            overlay.duration,
            &label,
        ));
        previous = label;
    }

    cmd.filter_complex(chains.join(";"))
        .map(format!("[{}]", previous))
        .map("0:a?")
        .output_args(encoding.to_ffmpeg_args())
        .duration(base_duration)
        .faststart()
}

impl Compositor {
    /// Overlay each image in `image_inputs` on `base`, in order, and write the
    /// result to `output`.
    ///
    /// Later overlays are drawn above earlier ones. Every overlay starts at
    /// t=0; the base audio is kept as is.
    pub async fn add_image_clips_to_video(
        &self,
        base: impl AsRef<Path>,
        image_inputs: &[ImageInput],
        output: impl AsRef<Path>,
        encoding: &EncodingConfig,
    ) -> MediaResult<PathBuf> {
        let base = base.as_ref();
        let output = output.as_ref();
        validate_image_inputs(image_inputs)?;

        check_file_exists(base)?;
        for input in image_inputs {
            check_file_exists(&input.path)?;
        }

        let info = probe_media(base).await?;
        if !info.has_video {
            return Err(MediaError::InvalidMedia(format!(
                "{} has no video stream",
                base.display()
            )));
        }

        info!(
            base = %base.display(),
            output = %output.display(),
            overlays = image_inputs.len(),
            duration = info.duration,
            "adding image overlays"
        );

        let scratch = TempDir::new()?;
        let mut overlays = Vec::with_capacity(image_inputs.len());
        for (i, input) in image_inputs.iter().enumerate() {
            let path = if input.height.is_some() || needs_png_conversion(&input.path) {
                let dest = scratch.path().join(format!("overlay_{}.png", i));
                write_png_still(&input.path, input.height, dest).await?
            } else {
                input.path.clone()
            };
            let duration = effective_overlay_duration(input.duration, info.duration, info.fps)?;
            debug!(path = %path.display(), duration, "resolved overlay");

            overlays.push(ResolvedOverlay {
                path,
                input: input.clone(),
                duration,
            });
        }

        let cmd = build_overlay_command(base, &overlays, info.duration, info.fps, output, encoding);
        render_atomically(&self.runner, cmd, "add_image_clips_to_video", info.duration).await?;

        info!(output = %output.display(), "image overlays complete");
        Ok(output.to_path_buf())
    }
}
