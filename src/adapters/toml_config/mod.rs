// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{QuickEditError, QuickEditResult};

/// Process-wide configuration, read-only once requests start
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuickEditConfig {
    /// Path to ffmpeg binary.
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    pub ffprobe_path: PathBuf,

    /// Directory for staging files.
    pub scratch_dir: PathBuf,

    /// ffmpeg `-loglevel` value.
    pub ffmpeg_log_level: String,

    /// Ceiling on one ffmpeg run, in seconds.
    pub encode_timeout_secs: Option<u64>,

    /// Ceiling on one attachment download, in seconds.
    pub fetch_timeout_secs: Option<u64>,

    /// HTTP user agent for downloads.
    pub user_agent: String,

    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Check that ffmpeg and ffprobe run before accepting requests.
    pub verify_tools: bool,
}

impl Default for QuickEditConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            scratch_dir: std::env::temp_dir().join("quickedit"),
            ffmpeg_log_level: "error".to_string(),
            encode_timeout_secs: None,
            fetch_timeout_secs: None,
            user_agent: format!("quickedit/{}", env!("CARGO_PKG_VERSION")),
            log_level: "info".to_string(),
            json_logs: false,
            verify_tools: true,
        }
    }
}

impl QuickEditConfig {
    /// Reject values that would only fail later, mid-request
    pub fn validate(&self) -> QuickEditResult<()> {
        const FFMPEG_LEVELS: [&str; 9] = [
            "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
        ];
        if !FFMPEG_LEVELS.contains(&self.ffmpeg_log_level.as_str()) {
            return Err(QuickEditError::ConfigError {
                message: format!(
                    "ffmpeg_log_level must be one of {}, got {:?}",
                    FFMPEG_LEVELS.join(", "),
                    self.ffmpeg_log_level
                ),
            });
        }
        if self.encode_timeout_secs == Some(0) || self.fetch_timeout_secs == Some(0) {
            return Err(QuickEditError::ConfigError {
                message: "timeouts must be greater than zero".to_string(),
            });
        }
        if self.scratch_dir.as_os_str().is_empty() {
            return Err(QuickEditError::ConfigError {
                message: "scratch_dir cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Envelope matching the file layout: settings live under `[quickedit]`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    quickedit: Option<QuickEditConfig>,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Default config file looked up in the working directory
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("quickedit.toml")
    }

    /// Parse configuration from TOML text
    pub fn parse(toml_content: &str) -> QuickEditResult<QuickEditConfig> {
        let file: ConfigFile = toml::from_str(toml_content)?;
        Ok(file.quickedit.unwrap_or_default())
    }

    /// Load configuration from a file
    pub fn load(file_path: &Path) -> QuickEditResult<QuickEditConfig> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            QuickEditError::ConfigError {
                message: format!("failed to read {}: {}", file_path.display(), e),
            }
        })?;
        Self::parse(&content)
    }
}
