//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Maximum number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 40;

/// One `-i` source together with the options that precede it.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegInput {
    /// File path or lavfi graph
    source: String,
    /// Input arguments (before -i)
    args: Vec<String>,
}

impl FfmpegInput {
    /// A file input.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            source: path.as_ref().to_string_lossy().to_string(),
            args: Vec::new(),
        }
    }

    /// A still image repeated as a video stream.
    pub fn looped_image(path: impl AsRef<Path>, fps: f64, seconds: f64) -> Self {
        Self::file(path)
            .arg("-loop")
            .arg("1")
            .arg("-framerate")
            .arg(format!("{:.3}", fps))
            .arg("-t")
            .arg(format!("{:.3}", seconds))
    }

    /// Add an input argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in index order (`0:v`, `1:v`, ...)
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append an input; its index is the number of inputs added before it.
    pub fn input(mut self, input: FfmpegInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Append a plain file input.
    pub fn input_file(self, path: impl AsRef<Path>) -> Self {
        self.input(FfmpegInput::file(path))
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream specifier or filter label into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Limit the output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Copy the video stream without re-encoding.
    pub fn video_copy(self) -> Self {
        self.output_arg("-c:v").output_arg("copy")
    }

    /// Move the moov atom to the front for progressive playback.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Redirect the command to a different output path.
    pub fn with_output(mut self, output: impl AsRef<Path>) -> Self {
        self.output = output.as_ref().to_path_buf();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn inputs(&self) -> &[FfmpegInput] {
        &self.inputs
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());
        args.push("-nostats".to_string());

        // Progress output to stderr
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

enum Completion {
    Exited(std::io::Result<ExitStatus>),
    Cancelled,
    TimedOut(u64),
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner honoring `FFMPEG_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let runner = Self::new();
        match std::env::var("FFMPEG_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            Some(secs) => runner.with_timeout(secs),
            None => runner,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(
        &self,
        cmd: &FfmpegCommand,
        progress_callback: F,
    ) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr was not captured"))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress lines are key=value; everything else is diagnostics.
        let stderr_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut tail: Vec<String> = Vec::new();

            while let Ok(Some(line)) = reader.next_line().await {
                if let Some(progress) = parse_progress_line(&line, &mut current_progress) {
                    progress_callback(progress);
                } else if !is_progress_field(&line) {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.remove(0);
                    }
                    tail.push(line);
                }
            }

            tail.join("\n")
        });

        let completion = self.wait_for_completion(&mut child).await;
        let stderr_tail = stderr_handle.await.unwrap_or_default();

        match completion {
            Completion::Exited(status) => {
                let status = status?;
                if status.success() {
                    Ok(())
                } else {
                    Err(MediaError::ffmpeg_failed(
                        "FFmpeg exited with non-zero status",
                        (!stderr_tail.is_empty()).then_some(stderr_tail),
                        status.code(),
                    ))
                }
            }
            Completion::Cancelled => Err(MediaError::Cancelled),
            Completion::TimedOut(secs) => Err(MediaError::Timeout(secs)),
        }
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> Completion {
        let timeout_secs = self.timeout_secs;
        let mut cancel_rx = self.cancel_rx.clone();

        let timed_out = async move {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async move {
            match cancel_rx.as_mut() {
                Some(rx) => loop {
                    if *rx.borrow() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // Sender dropped without cancelling.
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let completion = tokio::select! {
            status = child.wait() => Completion::Exited(status),
            _ = cancelled => Completion::Cancelled,
            _ = timed_out => Completion::TimedOut(timeout_secs.unwrap_or_default()),
        };

        match completion {
            Completion::Cancelled => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
            }
            Completion::TimedOut(secs) => {
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
            }
            Completion::Exited(_) => {}
        }

        completion
    }
}

fn is_progress_field(line: &str) -> bool {
    let line = line.trim();
    match line.split_once('=') {
        Some((key, _)) => !key.is_empty() && !key.contains(' '),
        None => false,
    }
}

/// Parse a progress line from FFmpeg's -progress output.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys carry microseconds in practice; store milliseconds.
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "out_time" => {
                current.out_time = value.to_string();
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    current.fps = fps;
                }
            }
            "speed" => {
                // Format: "1.5x" or "N/A"
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    current.speed = speed;
                }
            }
            "progress" => {
                // "continue" or "end"
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_orders_inputs() {
        let cmd = FfmpegCommand::new("out.mp4")
            .input_file("base.mp4")
            .input(FfmpegInput::looped_image("logo.png", 25.0, 3.0))
            .filter_complex("[0:v][1:v]overlay[v]")
            .map("[v]")
            .map("0:a?");

        let args = cmd.build_args();
        let first_i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[first_i + 1], "base.mp4");

        let loop_pos = args.iter().position(|a| a == "-loop").unwrap();
        let second_i = args.iter().rposition(|a| a == "-i").unwrap();
        assert!(loop_pos > first_i && loop_pos < second_i);
        assert_eq!(args[second_i + 1], "logo.png");
        assert!(args.contains(&"3.000".to_string()));

        let fc = args.iter().position(|a| a == "-filter_complex").unwrap();
        assert!(fc > second_i);
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_with_output_replaces_target() {
        let cmd = FfmpegCommand::new("final.mp4")
            .input_file("in.mp4")
            .with_output("/tmp/scratch.mp4");
        assert_eq!(cmd.output(), Path::new("/tmp/scratch.mp4"));
        assert_eq!(cmd.build_args().last().unwrap(), "/tmp/scratch.mp4");
    }

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        parse_progress_line("out_time_us=5000000", &mut progress);
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        parse_progress_line("speed=N/A", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let result = parse_progress_line("progress=end", &mut progress);
        assert!(result.is_some());
        assert!(progress.is_complete);
    }

    #[test]
    fn test_progress_field_detection() {
        assert!(is_progress_field("frame=12"));
        assert!(is_progress_field("bitrate=N/A"));
        assert!(!is_progress_field("Error opening input file missing.mp4."));
        assert!(!is_progress_field("[overlay @ 0x1] Option x = bad"));
    }

    #[test]
    fn test_runner_timeout_builder() {
        assert_eq!(FfmpegRunner::new().timeout_secs(), None);
        assert_eq!(FfmpegRunner::new().with_timeout(90).timeout_secs(), Some(90));
    }
}
