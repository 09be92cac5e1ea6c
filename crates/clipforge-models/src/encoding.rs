//! Video encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Default output pixel format (widest player compatibility)
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264", "h264_nvenc", "mpeg4")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Additional FFmpeg output arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Returns a new config with a different video codec.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    /// Append raw output arguments.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Whether the video codec understands `-preset`/`-crf` (x264/x265 family).
    pub fn supports_rate_factor(&self) -> bool {
        self.codec.starts_with("libx26")
    }

    /// Video encoder arguments.
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.codec.clone()];

        if self.supports_rate_factor() {
            args.extend_from_slice(&[
                "-preset".to_string(),
                self.preset.clone(),
                "-crf".to_string(),
                self.crf.to_string(),
            ]);
        }

        args.extend_from_slice(&["-pix_fmt".to_string(), self.pixel_format.clone()]);
        args
    }

    /// Audio encoder arguments.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }

    /// Convert to FFmpeg command arguments (video, audio, then extras).
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = self.video_args();
        args.extend(self.audio_args());
        args.extend(self.extra_args.clone());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.crf, 18);
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = EncodingConfig::default().to_ffmpeg_args();
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"18".to_string()));
        assert!(args.contains(&"aac".to_string()));
    }

    #[test]
    fn test_non_x264_codec_skips_rate_factor() {
        let config = EncodingConfig::default()
            .with_codec("mpeg4")
            .with_extra_args(["-q:v", "5"]);
        let args = config.to_ffmpeg_args();
        assert!(!args.contains(&"-crf".to_string()));
        assert!(!args.contains(&"-preset".to_string()));
        assert_eq!(&args[args.len() - 2..], &["-q:v".to_string(), "5".to_string()]);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: EncodingConfig = serde_json::from_str(r#"{"crf": 23}"#).unwrap();
        assert_eq!(config.crf, 23);
        assert_eq!(config.codec, DEFAULT_VIDEO_CODEC);
        assert_eq!(config.pixel_format, DEFAULT_PIXEL_FORMAT);
    }
}
