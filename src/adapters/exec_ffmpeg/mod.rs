//! FFmpeg execution adapter
//!
//! Runs the external `ffmpeg` binary once per [`TranscodeJob`]. The argument
//! set is fixed per [`TranscodeKind`]; only paths, frame rate and the trim
//! window vary.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::error::{QuickEditError, QuickEditResult};
use crate::ports::*;
use crate::utils::time::TimeParser;

/// Width of animated output; height follows the aspect ratio
const ANIMATED_SCALE: &str = "scale=500:-1:flags=lanczos";
const ANIMATED_BITRATE: &str = "3000k";
const ANIMATED_PIX_FMT: &str = "rgb24";
const PRESET: &str = "slow";

/// Longest stderr tail kept on an encode failure
const STDERR_TAIL: usize = 4096;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    ffmpeg_path: PathBuf,
    log_level: String,
    timeout: Option<Duration>,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(
        ffmpeg_path: impl Into<PathBuf>,
        log_level: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            log_level: log_level.into(),
            timeout,
        }
    }

    /// Build the full argument list for one job
    pub fn build_args(&self, job: &TranscodeJob) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
        ];

        let input = job.input.to_string_lossy().into_owned();
        let output = job.output.to_string_lossy().into_owned();

        match &job.kind {
            TranscodeKind::Direct => {
                args.extend(["-i".to_string(), input]);
                args.extend(["-preset".to_string(), PRESET.to_string()]);
            }
            TranscodeKind::Animated { fps } => {
                args.extend(["-i".to_string(), input]);
                args.extend([
                    "-filter_complex".to_string(),
                    format!("fps={},{}", fps, ANIMATED_SCALE),
                ]);
                args.extend(["-b:v".to_string(), ANIMATED_BITRATE.to_string()]);
                args.extend(["-pix_fmt".to_string(), ANIMATED_PIX_FMT.to_string()]);
                args.extend(["-preset".to_string(), PRESET.to_string()]);
            }
            TranscodeKind::Trim { window } => {
                let parser = TimeParser::new();
                // Seeking before -i is input seeking; -t then counts from the new start.
                args.extend(["-ss".to_string(), parser.format_duration(window.start)]);
                args.extend(["-i".to_string(), input]);
                args.extend(["-preset".to_string(), PRESET.to_string()]);
                args.extend(["-t".to_string(), parser.format_duration(window.duration())]);
            }
        }

        args.push(output);
        args
    }

    /// Check that the configured binary can be executed
    pub async fn verify_available(&self) -> QuickEditResult<()> {
        verify_tool("ffmpeg", &self.ffmpeg_path).await
    }
}

#[async_trait]
impl TranscodePort for FFmpegAdapter {
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), ConversionError> {
        let args = self.build_args(job);
        debug!("Running {} {}", self.ffmpeg_path.display(), args.join(" "));

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let run = command.output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                ConversionError::encode_failed(format!(
                    "ffmpeg timed out after {}s",
                    limit.as_secs()
                ))
            })?,
            None => run.await,
        }
        .map_err(|e| {
            ConversionError::encode_failed(format!(
                "failed to start {}: {}",
                self.ffmpeg_path.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            error!("ffmpeg exited with {}: {}", output.status, stderr);
            return Err(ConversionError::EncodeFailed {
                reason: format!("ffmpeg exited with {}", output.status),
                stderr: Some(stderr),
            });
        }

        Ok(())
    }
}

/// Run `<tool> -version` and map any failure to [`QuickEditError::ToolNotFound`]
pub(crate) async fn verify_tool(tool: &'static str, path: &Path) -> QuickEditResult<()> {
    let status = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await;

    match status {
        Ok(status) if status.success() => {
            debug!("{} found at {}", tool, path.display());
            Ok(())
        }
        _ => Err(QuickEditError::ToolNotFound {
            tool,
            path: path.to_path_buf(),
        }),
    }
}

/// Last `STDERR_TAIL` bytes of tool output, lossily decoded
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
