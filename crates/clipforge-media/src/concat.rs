//! End-to-end concatenation of video segments.

use std::path::{Path, PathBuf};

use clipforge_models::{EncodingConfig, VideoInput};
use tracing::info;

use crate::command::FfmpegCommand;
use crate::compositor::Compositor;
use crate::error::{MediaError, MediaResult};
use crate::filters::{concat_chain, fitted_audio_chain, normalize_video_chain, silence_chain};
use crate::imaging::check_file_exists;
use crate::probe::{probe_media, MediaInfo};
use crate::render::render_atomically;

/// Build the concat command. Every segment is scaled to the first segment's
/// frame; when any segment carries audio, each audio track is fitted to its
/// segment's video length, and silent segments get silence of that length.
pub(crate) fn build_concat_command(
    segments: &[(PathBuf, MediaInfo)],
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<FfmpegCommand> {
    let (_, first) = segments
        .first()
        .ok_or_else(|| MediaError::invalid_argument("at least one video segment is required"))?;
    let any_audio = segments.iter().any(|(_, info)| info.has_audio);

    let mut cmd = FfmpegCommand::new(output);
    let mut chains = Vec::new();
    let mut labels = Vec::with_capacity(segments.len());

    for (i, (path, info)) in segments.iter().enumerate() {
        cmd = cmd.input_file(path);

        let video = format!("v{}", i);
        chains.push(normalize_video_chain(i, first.width, first.height, first.fps, &video));

        let audio = if any_audio {
            let label = format!("a{}", i);
            let length = info.video_length();
            if info.has_audio {
                chains.push(fitted_audio_chain(i, length, &label));
            } else {
                chains.push(silence_chain(length, &label));
            }
            Some(label)
        } else {
            None
        };
        labels.push((video, audio));
    }

    chains.push(concat_chain(&labels, "vout", any_audio.then_some("aout")));

    let mut cmd = cmd.filter_complex(chains.join(";")).map("[vout]");
    cmd = if any_audio {
        cmd.map("[aout]").output_args(encoding.to_ffmpeg_args())
    } else {
        cmd.output_args(encoding.video_args())
            .output_args(encoding.extra_args.clone())
    };
    Ok(cmd.faststart())
}

impl Compositor {
    /// Join `video_inputs` end to end into `output`.
    ///
    /// No gaps or transitions; the output lasts as long as all segments
    /// together.
    pub async fn concatenate_video_clips(
        &self,
        video_inputs: &[VideoInput],
        output: impl AsRef<Path>,
        encoding: &EncodingConfig,
    ) -> MediaResult<PathBuf> {
        let output = output.as_ref();
        if video_inputs.is_empty() {
            return Err(MediaError::invalid_argument(
                "at least one video segment is required",
            ));
        }
        for input in video_inputs {
            check_file_exists(&input.path)?;
        }

        let mut segments = Vec::with_capacity(video_inputs.len());
        for input in video_inputs {
            let info = probe_media(&input.path).await?;
            if !info.has_video {
                return Err(MediaError::InvalidMedia(format!(
                    "{} has no video stream",
                    input.path.display()
                )));
            }
            segments.push((input.path.clone(), info));
        }
        let total: f64 = segments.iter().map(|(_, info)| info.video_length()).sum();

        info!(
            segments = segments.len(),
            output = %output.display(),
            total_duration = total,
            "concatenating video segments"
        );

        let cmd = build_concat_command(&segments, output, encoding)?;
        render_atomically(&self.runner, cmd, "concatenate_video_clips", total).await?;

        info!(output = %output.display(), "concatenation complete");
        Ok(output.to_path_buf())
    }
}
