//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use crate::adapters::{QuickEditConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::error::{QuickEditError, QuickEditResult};

/// Prefix of every environment override
const ENV_PREFIX: &str = "QUICKEDIT_";

/// Settings the command line may override
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl From<&Cli> for ConfigOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            log_level: cli.log_level.clone(),
            json_logs: cli.json_logs,
        }
    }
}

/// Build the process configuration: CLI > Env > File > Defaults
pub fn initialize_configuration(cli: &Cli) -> QuickEditResult<QuickEditConfig> {
    initialize_configuration_with(&ConfigOverrides::from(cli), |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration`] with an injectable environment
pub fn initialize_configuration_with<F>(
    overrides: &ConfigOverrides,
    env: F,
) -> QuickEditResult<QuickEditConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = load_config_file(overrides.config_path.as_deref())?;
    apply_environment(&mut config, env)?;

    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }
    if overrides.json_logs {
        config.json_logs = true;
    }

    config.validate()?;
    Ok(config)
}

/// An explicit path must exist; the default path is optional
fn load_config_file(explicit: Option<&Path>) -> QuickEditResult<QuickEditConfig> {
    match explicit {
        Some(path) => TomlConfigAdapter::load(path),
        None => {
            let default_path = TomlConfigAdapter::default_config_path();
            if default_path.is_file() {
                TomlConfigAdapter::load(&default_path)
            } else {
                Ok(QuickEditConfig::default())
            }
        }
    }
}

fn apply_environment<F>(config: &mut QuickEditConfig, env: F) -> QuickEditResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.is_empty());

    if let Some(value) = var("FFMPEG_PATH") {
        config.ffmpeg_path = PathBuf::from(value);
    }
    if let Some(value) = var("FFPROBE_PATH") {
        config.ffprobe_path = PathBuf::from(value);
    }
    if let Some(value) = var("SCRATCH_DIR") {
        config.scratch_dir = PathBuf::from(value);
    }
    if let Some(value) = var("FFMPEG_LOG_LEVEL") {
        config.ffmpeg_log_level = value;
    }
    if let Some(value) = var("ENCODE_TIMEOUT_SECS") {
        config.encode_timeout_secs = Some(parse_secs("ENCODE_TIMEOUT_SECS", &value)?);
    }
    if let Some(value) = var("FETCH_TIMEOUT_SECS") {
        config.fetch_timeout_secs = Some(parse_secs("FETCH_TIMEOUT_SECS", &value)?);
    }
    if let Some(value) = var("USER_AGENT") {
        config.user_agent = value;
    }
    if let Some(value) = var("LOG_LEVEL") {
        config.log_level = value;
    }
    if let Some(value) = var("JSON_LOGS") {
        config.json_logs = parse_bool("JSON_LOGS", &value)?;
    }
    if let Some(value) = var("VERIFY_TOOLS") {
        config.verify_tools = parse_bool("VERIFY_TOOLS", &value)?;
    }
    Ok(())
}

fn parse_secs(name: &str, value: &str) -> QuickEditResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| QuickEditError::ConfigError {
            message: format!(
                "{}{} must be a whole number of seconds, got {:?}",
                ENV_PREFIX, name, value
            ),
        })
}

fn parse_bool(name: &str, value: &str) -> QuickEditResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(QuickEditError::ConfigError {
            message: format!("{}{} must be a boolean, got {:?}", ENV_PREFIX, name, value),
        }),
    }
}
