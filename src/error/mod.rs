//! Error handling module for QuickEdit start-up and dispatch

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised outside a single conversion request
#[derive(Error, Debug)]
pub enum QuickEditError {
    /// Configuration could not be built
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// External tool missing or not executable
    #[error("{tool} not found or not executable at {}", path.display())]
    ToolNotFound { tool: &'static str, path: PathBuf },

    /// Batch request file could not be understood
    #[error("Invalid batch file {}: {message}", path.display())]
    BatchFileError { path: PathBuf, message: String },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClientError(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for QuickEdit operations
pub type QuickEditResult<T> = std::result::Result<T, QuickEditError>;
