//! Audio tracks mixed onto a base video.

use std::path::{Path, PathBuf};

use clipforge_models::{AudioInput, EncodingConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::command::FfmpegCommand;
use crate::compositor::Compositor;
use crate::error::{MediaError, MediaResult};
use crate::filters::{delayed_clip_chain, fitted_audio_chain, mix_chain, silence_chain};
use crate::imaging::check_file_exists;
use crate::probe::probe_media;
use crate::render::render_atomically;

/// An audio source placed on the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub path: PathBuf,
    /// Offset into the output, in seconds
    pub start_time: f64,
    /// Seconds this clip occupies on the timeline
    pub duration: f64,
    /// Length of the source file
    pub source_duration: f64,
}

impl AudioClip {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Seconds the clip at `index` plays for.
///
/// An explicit duration wins. Otherwise the clip runs until the next clip
/// starts, or until `total_duration` for the last one.
pub fn calculate_audio_duration(
    index: usize,
    audio_inputs: &[AudioInput],
    total_duration: f64,
) -> MediaResult<f64> {
    let input = audio_inputs.get(index).ok_or_else(|| {
        MediaError::invalid_argument(format!(
            "audio index {} out of range for {} inputs",
            index,
            audio_inputs.len()
        ))
    })?;

    if let Some(duration) = input.duration {
        return Ok(duration);
    }

    Ok(match audio_inputs.get(index + 1) {
        Some(next) => next.start_time - input.start_time,
        None => total_duration - input.start_time,
    })
}

/// Check the placement of every input against an output of `total_duration`.
fn validate_audio_inputs(audio_inputs: &[AudioInput], total_duration: f64) -> MediaResult<Vec<f64>> {
    let mut durations = Vec::with_capacity(audio_inputs.len());
    for (i, input) in audio_inputs.iter().enumerate() {
        if !(0.0..total_duration).contains(&input.start_time) {
            return Err(MediaError::invalid_argument(format!(
                "audio {} starts at {}s, outside the {:.3}s output",
                input.path.display(),
                input.start_time,
                total_duration
            )));
        }

        let duration = calculate_audio_duration(i, audio_inputs, total_duration)?;
        if duration <= 0.0 || !duration.is_finite() {
            return Err(MediaError::invalid_argument(format!(
                "audio {} resolves to a non-positive duration ({}s)",
                input.path.display(),
                duration
            )));
        }
        durations.push(duration);
    }
    Ok(durations)
}

/// Resolve every input into an [`AudioClip`], in input order.
pub async fn load_audio_clips(
    audio_inputs: &[AudioInput],
    total_duration: f64,
) -> MediaResult<Vec<AudioClip>> {
    let durations = validate_audio_inputs(audio_inputs, total_duration)?;

    let mut clips = Vec::with_capacity(audio_inputs.len());
    for (input, duration) in audio_inputs.iter().zip(durations) {
        check_file_exists(&input.path)?;
        let info = probe_media(&input.path).await?;
        if !info.has_audio {
            return Err(MediaError::InvalidMedia(format!(
                "{} has no audio stream",
                input.path.display()
            )));
        }

        let clip = AudioClip {
            path: input.path.clone(),
            start_time: input.start_time,
            duration,
            source_duration: info.duration,
        };
        debug!(
            path = %clip.path.display(),
            start = clip.start_time,
            duration = clip.duration,
            "loaded audio clip"
        );
        clips.push(clip);
    }
    Ok(clips)
}

/// Build the mixing command: base video on input 0, one input per clip.
pub(crate) fn build_audio_mix_command(
    base: &Path,
    base_has_audio: bool,
    clips: &[AudioClip],
    total_duration: f64,
    output: &Path,
    encoding: &EncodingConfig,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output).input_file(base);
    let mut chains = Vec::with_capacity(clips.len() + 2);
    let mut labels = Vec::with_capacity(clips.len() + 1);

    // The bed fixes the mix length to the base duration.
    if base_has_audio {
        chains.push(fitted_audio_chain(0, total_duration, "bed"));
    } else {
        chains.push(silence_chain(total_duration, "bed"));
    }
    labels.push("bed".to_string());

    for (i, clip) in clips.iter().enumerate() {
        let index = i + 1;
        cmd = cmd.input_file(&clip.path);
        let label = format!("a{}", index);
        chains.push(delayed_clip_chain(index, clip.start_time, clip.duration, &label));
        labels.push(label);
    }

    chains.push(mix_chain(&labels, "aout"));

    cmd.filter_complex(chains.join(";"))
        .map("0:v")
        .map("[aout]")
        .video_copy()
        .output_args(encoding.audio_args())
        .duration(total_duration)
        .faststart()
}

impl Compositor {
    /// Mix `audio_inputs` onto `base` and write the result to `output`.
    ///
    /// Clips are trimmed or padded to their duration, shifted to their start
    /// time and summed with the base audio. The video stream is copied.
    pub async fn add_audio_clips_to_video(
        &self,
        base: impl AsRef<Path>,
        audio_inputs: &[AudioInput],
        output: impl AsRef<Path>,
        encoding: &EncodingConfig,
    ) -> MediaResult<PathBuf> {
        let base = base.as_ref();
        let output = output.as_ref();
        if audio_inputs.is_empty() {
            return Err(MediaError::invalid_argument(
                "at least one audio clip is required",
            ));
        }

        check_file_exists(base)?;
        let info = probe_media(base).await?;
        let total = info.duration;

        let clips = load_audio_clips(audio_inputs, total).await?;

        info!(
            base = %base.display(),
            output = %output.display(),
            clips = clips.len(),
            duration = total,
            "adding audio clips"
        );

        let cmd = build_audio_mix_command(base, info.has_audio, &clips, total, output, encoding);
        render_atomically(&self.runner, cmd, "add_audio_clips_to_video", total).await?;

        info!(output = %output.display(), "audio mix complete");
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> Vec<AudioInput> {
        vec![
            AudioInput::new("a.mp3"),
            AudioInput::new("b.mp3").starting_at(3.0),
            AudioInput::new("c.mp3").starting_at(6.0),
        ]
    }

    #[test]
    fn test_duration_runs_until_next_clip() {
        let inputs = inputs();
        assert_eq!(calculate_audio_duration(0, &inputs, 10.0).unwrap(), 3.0);
        assert_eq!(calculate_audio_duration(1, &inputs, 10.0).unwrap(), 3.0);
    }

    #[test]
    fn test_last_clip_runs_until_end() {
        assert_eq!(calculate_audio_duration(2, &inputs(), 10.0).unwrap(), 4.0);
    }

    #[test]
    fn test_two_clips_share_output_until_end() {
        let inputs = vec![
            AudioInput::new("a.mp3"),
            AudioInput::new("b.mp3").starting_at(3.0),
        ];
        assert_eq!(calculate_audio_duration(0, &inputs, 6.0).unwrap(), 3.0);
        assert_eq!(calculate_audio_duration(1, &inputs, 6.0).unwrap(), 3.0);

        assert_eq!(calculate_audio_duration(0, &inputs, 7.0).unwrap(), 3.0);
        assert_eq!(calculate_audio_duration(1, &inputs, 7.0).unwrap(), 4.0);
    }

    #[test]
    fn test_explicit_duration_wins() {
        let mut inputs = inputs();
        inputs[0] = AudioInput::new("a.mp3").with_duration(1.25);
        assert_eq!(calculate_audio_duration(0, &inputs, 10.0).unwrap(), 1.25);
    }

    #[test]
    fn test_out_of_range_index() {
        assert!(calculate_audio_duration(3, &inputs(), 10.0)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_start_outside_output_rejected() {
        let late = vec![AudioInput::new("a.mp3").starting_at(10.0)];
        assert!(validate_audio_inputs(&late, 10.0).unwrap_err().is_invalid_argument());

        let negative = vec![AudioInput::new("a.mp3").starting_at(-0.5)];
        assert!(validate_audio_inputs(&negative, 10.0)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_non_positive_resolved_duration_rejected() {
        // Second clip starts before the first, so the first gets a negative span.
        let unordered = vec![
            AudioInput::new("a.mp3").starting_at(5.0),
            AudioInput::new("b.mp3").starting_at(2.0),
        ];
        assert!(validate_audio_inputs(&unordered, 10.0)
            .unwrap_err()
            .is_invalid_argument());

        let zero = vec![AudioInput::new("a.mp3").with_duration(0.0)];
        assert!(validate_audio_inputs(&zero, 10.0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_mix_command_copies_video() {
        let clips = vec![AudioClip {
            path: PathBuf::from("music.mp3"),
            start_time: 1.0,
            duration: 2.0,
            source_duration: 30.0,
        }];
        let cmd = build_audio_mix_command(
            Path::new("base.mp4"),
            false,
            &clips,
            5.0,
            Path::new("out.mp4"),
            &EncodingConfig::default(),
        );
        let args = cmd.build_args();
        let fc = args.iter().position(|a| a == "-filter_complex").unwrap();
        let graph = &args[fc + 1];

        assert!(graph.starts_with("anullsrc=r=44100:cl=stereo,atrim=duration=5.000[bed]"));
        assert!(graph.contains("adelay=1000|1000[a1]"));
        assert!(graph.ends_with("[bed][a1]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]"));
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "copy"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:v"));
        assert!(!args.contains(&"-crf".to_string()));
        assert_eq!(clips[0].end_time(), 3.0);
    }

    #[tokio::test]
    async fn test_empty_audio_inputs_rejected() {
        let err = Compositor::new()
            .add_audio_clips_to_video(
                "/missing/base.mp4",
                &[],
                "/missing/out.mp4",
                &EncodingConfig::default(),
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
