//! Render a command into a scratch file and move it into place on success.

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::progress::log_progress;

/// Scratch file next to `output`, sharing its extension so FFmpeg picks the
/// same muxer.
fn scratch_file_for(output: &Path) -> MediaResult<NamedTempFile> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&parent)?;

    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    Ok(tempfile::Builder::new()
        .prefix(".clipforge-")
        .suffix(&suffix)
        .tempfile_in(parent)?)
}

/// Run `cmd` against a scratch file and rename it to `cmd.output()` once
/// FFmpeg succeeds. The scratch file is removed on every failure path.
pub(crate) async fn render_atomically(
    runner: &FfmpegRunner,
    cmd: FfmpegCommand,
    operation: &'static str,
    expected_seconds: f64,
) -> MediaResult<()> {
    let output = cmd.output().to_path_buf();
    let scratch = scratch_file_for(&output)?;
    let cmd = cmd.with_output(scratch.path());

    debug!(operation, scratch = %scratch.path().display(), "rendering to scratch file");
    runner
        .run_with_progress(&cmd, log_progress(operation, expected_seconds))
        .await?;

    scratch
        .persist(&output)
        .map_err(|e| MediaError::Io(e.error))?;
    Ok(())
}
