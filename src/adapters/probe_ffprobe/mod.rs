//! FFprobe adapter for media file probing
//!
//! Only the container duration is read; stream details are not needed by
//! any operation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, error};

use super::exec_ffmpeg::{stderr_tail, verify_tool};
use crate::domain::errors::*;
use crate::error::QuickEditResult;
use crate::ports::*;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    ffprobe_path: PathBuf,
    timeout: Option<Duration>,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe_path: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    /// Check that the configured binary can be executed
    pub async fn verify_available(&self) -> QuickEditResult<()> {
        verify_tool("ffprobe", &self.ffprobe_path).await
    }

    /// Parse `-show_entries format=duration -of json` output.
    ///
    /// A missing or `N/A` duration counts as zero, which callers treat as an
    /// empty source.
    pub fn parse_duration_output(output: &str) -> Result<Duration, ConversionError> {
        let probe: ProbeOutput = serde_json::from_str(output).map_err(|e| {
            ConversionError::encode_failed(format!("failed to parse ffprobe output: {}", e))
        })?;

        let raw = match probe.format.and_then(|f| f.duration) {
            Some(raw) if raw != "N/A" => raw,
            _ => return Ok(Duration::ZERO),
        };

        let secs: f64 = raw.trim().parse().map_err(|_| {
            ConversionError::encode_failed(format!("unparseable ffprobe duration {:?}", raw))
        })?;

        Duration::try_from_secs_f64(secs).map_err(|e| {
            ConversionError::encode_failed(format!("invalid ffprobe duration {:?}: {}", raw, e))
        })
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Result<Duration, ConversionError> {
        let mut command = Command::new(&self.ffprobe_path);
        command
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "json",
            ])
            .arg(file_path)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let run = command.output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                ConversionError::encode_failed(format!(
                    "ffprobe timed out after {}s",
                    limit.as_secs()
                ))
            })?,
            None => run.await,
        }
        .map_err(|e| {
            ConversionError::encode_failed(format!(
                "failed to start {}: {}",
                self.ffprobe_path.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr);
            error!("ffprobe exited with {}: {}", output.status, stderr);
            return Err(ConversionError::EncodeFailed {
                reason: format!("ffprobe exited with {}", output.status),
                stderr: Some(stderr),
            });
        }

        let duration = Self::parse_duration_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "Probed {}: {:.3}s",
            file_path.display(),
            duration.as_secs_f64()
        );
        Ok(duration)
    }
}
