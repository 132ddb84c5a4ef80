//! CLI module for QuickEdit
//!
//! Stand-in dispatcher: turns command-line arguments into conversion requests
//! and delivers each reply to the terminal and an output directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// QuickEdit media converter
///
/// Convert, trim and jpegify media attachments using ffmpeg and a bundled
/// image codec.
#[derive(Parser, Debug)]
#[command(name = "quickedit")]
#[command(about = "QuickEdit - convert, trim and jpegify media attachments")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./quickedit.toml when present)
    #[arg(long, env = "QUICKEDIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level, overrides configuration
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an attachment into another format
    Convert(args::ConvertArgs),
    /// Cut a video down to a start/end window
    Trim(args::TrimArgs),
    /// Re-encode an image as a heavily compressed JPEG
    Jpegify(args::JpegifyArgs),
    /// Run many requests from a JSON or YAML file concurrently
    Batch(args::BatchArgs),
}
