//! Entry point for the compositing operations.
//!
//! The operations themselves live in [`crate::overlay`], [`crate::concat`]
//! and [`crate::audio`]; this module holds the shared runner configuration.

use tokio::sync::watch;

use crate::command::FfmpegRunner;

/// Runs compositing jobs through FFmpeg.
///
/// Holds no per-call state: every operation validates its inputs, builds a
/// fresh filter graph and renders a single output file.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    pub(crate) runner: FfmpegRunner,
}

impl Compositor {
    /// Compositor without timeout or cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compositor honoring `FFMPEG_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self {
            runner: FfmpegRunner::from_env(),
        }
    }

    /// Use a preconfigured runner.
    pub fn with_runner(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    /// Abort renders when `cancel_rx` flips to `true`.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.runner = self.runner.with_cancel(cancel_rx);
        self
    }

    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }
}
