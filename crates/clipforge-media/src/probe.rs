//! Media inspection through FFprobe.

use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};
use crate::imaging::check_file_exists;

/// Frame rate assumed when a stream does not report a usable one.
pub const FALLBACK_FPS: f64 = 30.0;

/// Stream layout and timing of a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels (0 without a video stream)
    pub width: u32,
    /// Height in pixels (0 without a video stream)
    pub height: u32,
    /// Frame rate of the first video stream
    pub fps: f64,
    /// Duration of the first video stream, when FFprobe reports one
    #[serde(default)]
    pub video_duration: Option<f64>,
    pub has_video: bool,
    pub has_audio: bool,
    /// Codec names, one per stream
    pub codecs: Vec<String>,
}

impl MediaInfo {
    /// Length of one frame in seconds.
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.fps
    }

    /// Seconds of picture: the video stream's own duration, falling back to
    /// the container duration.
    pub fn video_length(&self) -> f64 {
        self.video_duration
            .filter(|d| *d > 0.0)
            .unwrap_or(self.duration)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();
    check_file_exists(path)?;
    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed for {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let info = parse_probe_output(&output.stdout)?;
    debug!(
        path = %path.display(),
        duration = info.duration,
        width = info.width,
        height = info.height,
        has_audio = info.has_audio,
        "probed media"
    );
    Ok(info)
}

/// Duration of a media file in seconds.
pub async fn get_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    Ok(probe_media(path).await?.duration)
}

fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    // Container duration first, then the longest stream.
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| s.duration.as_deref()?.parse::<f64>().ok())
                .reduce(f64::max)
        })
        .ok_or_else(|| MediaError::InvalidMedia("no duration reported".to_string()))?;

    let fps = video
        .and_then(|v| v.avg_frame_rate.as_deref().and_then(parse_frame_rate))
        .or_else(|| video.and_then(|v| v.r_frame_rate.as_deref().and_then(parse_frame_rate)))
        .unwrap_or(FALLBACK_FPS);

    Ok(MediaInfo {
        duration,
        width: video.and_then(|v| v.width).unwrap_or(0),
        height: video.and_then(|v| v.height).unwrap_or(0),
        fps,
        video_duration: video
            .and_then(|v| v.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok()),
        has_video: video.is_some(),
        has_audio,
        codecs: probe
            .streams
            .iter()
            .filter_map(|s| s.codec_name.clone())
            .collect(),
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97"); zero rates are rejected.
fn parse_frame_rate(s: &str) -> Option<f64> {
    let rate = match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den <= 0.0 {
                return None;
            }
            num / den
        }
        None => s.parse().ok()?,
    };
    (rate > 0.0).then_some(rate)
}
