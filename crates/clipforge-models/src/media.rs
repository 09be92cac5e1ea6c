//! Descriptors consumed by the composition engine.
//!
//! Each descriptor is built by the caller for a single call and discarded
//! afterwards. Paths are plain filesystem paths; nothing here touches disk.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Named horizontal anchor inside the base frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Named vertical anchor inside the base frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Horizontal placement: an anchor or a pixel offset from the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum HorizontalPosition {
    Anchor(HorizontalAnchor),
    Pixels(i32),
}

/// Vertical placement: an anchor or a pixel offset from the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum VerticalPosition {
    Anchor(VerticalAnchor),
    Pixels(i32),
}

/// Overlay placement, serialized as a two element array
/// (`["right", "top"]`, `[40, 20]`, or a mix of both).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Position(pub HorizontalPosition, pub VerticalPosition);

impl Position {
    /// Position from two named anchors.
    pub fn anchored(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        Self(
            HorizontalPosition::Anchor(horizontal),
            VerticalPosition::Anchor(vertical),
        )
    }

    /// Position from pixel coordinates of the overlay's top-left corner.
    pub fn pixels(x: i32, y: i32) -> Self {
        Self(HorizontalPosition::Pixels(x), VerticalPosition::Pixels(y))
    }

    pub fn horizontal(&self) -> HorizontalPosition {
        self.0
    }

    pub fn vertical(&self) -> VerticalPosition {
        self.1
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::anchored(HorizontalAnchor::Right, VerticalAnchor::Top)
    }
}

/// An image composited on top of a base video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageInput {
    /// Path to the image file.
    pub path: PathBuf,
    /// Placement on the base frame.
    #[serde(default)]
    pub position: Position,
    /// Seconds on screen; the base video's duration when absent.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Target height in pixels; width follows the aspect ratio.
    #[serde(default)]
    pub height: Option<u32>,
}

impl ImageInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            position: Position::default(),
            duration: None,
            height: None,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }
}

/// One segment of a concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInput {
    /// Path to the video file.
    pub path: PathBuf,
}

impl VideoInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// An audio track mixed onto the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioInput {
    /// Path to the audio file.
    pub path: PathBuf,
    /// Offset into the output timeline, in seconds.
    #[serde(default)]
    pub start_time: f64,
    /// Seconds to play; runs until the next clip (or the end) when absent.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl AudioInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            start_time: 0.0,
            duration: None,
        }
    }

    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.start_time = seconds;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position_is_top_right() {
        let input = ImageInput::new("logo.png");
        assert_eq!(
            input.position,
            Position::anchored(HorizontalAnchor::Right, VerticalAnchor::Top)
        );
    }

    #[test]
    fn test_position_serde_forms() {
        let anchored: Position = serde_json::from_str(r#"["center", "bottom"]"#).unwrap();
        assert_eq!(
            anchored,
            Position::anchored(HorizontalAnchor::Center, VerticalAnchor::Bottom)
        );

        let pixels: Position = serde_json::from_str("[40, -10]").unwrap();
        assert_eq!(pixels, Position::pixels(40, -10));

        let mixed: Position = serde_json::from_str(r#"["left", 25]"#).unwrap();
        assert_eq!(mixed.horizontal(), HorizontalPosition::Anchor(HorizontalAnchor::Left));
        assert_eq!(mixed.vertical(), VerticalPosition::Pixels(25));

        assert_eq!(
            serde_json::to_string(&Position::default()).unwrap(),
            r#"["right","top"]"#
        );
    }

    #[test]
    fn test_unknown_anchor_rejected() {
        let result: Result<Position, _> = serde_json::from_str(r#"["middle", "top"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_image_input_defaults_from_json() {
        let input: ImageInput = serde_json::from_str(r#"{"path": "/tmp/a.png"}"#).unwrap();
        assert_eq!(input.path, PathBuf::from("/tmp/a.png"));
        assert!(input.duration.is_none());
        assert!(input.height.is_none());
    }

    #[test]
    fn test_audio_input_builder() {
        let input = AudioInput::new("music.mp3").starting_at(3.0).with_duration(2.5);
        assert_eq!(input.start_time, 3.0);
        assert_eq!(input.duration, Some(2.5));
    }
}
