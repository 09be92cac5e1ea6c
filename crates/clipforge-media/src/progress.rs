//! Render progress reported by FFmpeg's `-progress` stream.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (1.5 = 1.5x realtime)
    pub speed: f64,
    /// Set on the final `progress=end` block
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Percentage of `total_seconds` rendered so far, capped at 100.
    pub fn percentage(&self, total_seconds: f64) -> f64 {
        if total_seconds <= 0.0 {
            return 0.0;
        }
        let done = self.out_time_ms as f64 / 1000.0;
        (done / total_seconds * 100.0).clamp(0.0, 100.0)
    }

    /// Seconds left at the current speed, if the speed is known.
    pub fn eta_seconds(&self, total_seconds: f64) -> Option<f64> {
        if self.speed <= 0.0 || self.out_time_ms <= 0 {
            return None;
        }

        let remaining = total_seconds - self.out_time_ms as f64 / 1000.0;
        if remaining <= 0.0 {
            return Some(0.0);
        }

        Some(remaining / self.speed)
    }
}

/// Progress sink that logs each update against an expected output length.
pub fn log_progress(operation: &'static str, total_seconds: f64) -> impl Fn(FfmpegProgress) + Send + 'static {
    move |progress: FfmpegProgress| {
        debug!(
            operation,
            percent = progress.percentage(total_seconds),
            eta_secs = ?progress.eta_seconds(total_seconds),
            frame = progress.frame,
            complete = progress.is_complete,
            "render progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10.0) - 50.0).abs() < 0.01);
        assert!((progress.percentage(4.0) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0.0), 0.0);
    }

    #[test]
    fn test_eta_calculation() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            speed: 2.0,
            ..Default::default()
        };

        // 5 seconds left at 2x
        let eta = progress.eta_seconds(10.0).unwrap();
        assert!((eta - 2.5).abs() < 0.01);
        assert_eq!(progress.eta_seconds(3.0), Some(0.0));
    }

    #[test]
    fn test_eta_unknown_without_speed() {
        let progress = FfmpegProgress {
            out_time_ms: 1000,
            ..Default::default()
        };
        assert!(progress.eta_seconds(10.0).is_none());
    }
}
