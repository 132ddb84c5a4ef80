//! QuickEdit CLI
//!
//! Convert, trim and jpegify media attachments from the command line.
//!
//! # Usage
//!
//! ```bash
//! quickedit convert --url https://cdn.example.com/clip.mp4 --content-type video/mp4 --format .gif
//! quickedit trim --url https://cdn.example.com/clip.mp4 --content-type video/mp4 --start 1m30s
//! quickedit jpegify --url https://cdn.example.com/cat.png --content-type image/png --strength 90
//! quickedit batch --file requests.yaml --out-dir out/
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use quickedit::cli::{commands, Cli};
use quickedit::config_initialization::initialize_configuration;
use quickedit::utils::logging::init_logging;

/// Main entry point for the QuickEdit CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration(&cli).context("Failed to load configuration")?;
    init_logging(&config.log_level, config.json_logs);

    info!("Starting QuickEdit {}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let delivered = runtime.block_on(commands::run(cli.command, &config))?;
    drop(runtime);

    if !delivered {
        std::process::exit(1);
    }

    info!("QuickEdit completed successfully");
    Ok(())
}
