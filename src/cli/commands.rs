//! Command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use tracing::{info, warn};

use crate::adapters::QuickEditConfig;
use crate::app::{AppContainer, ConversionInteractor, DefaultAppContainer};
use crate::cli::Commands;
use crate::domain::model::*;
use crate::error::{QuickEditError, QuickEditResult};
use crate::utils::path::PathUtils;
use crate::utils::Utils;

/// Run one CLI command. Returns `false` when any request was answered with a message.
pub async fn run(command: Commands, config: &QuickEditConfig) -> Result<bool> {
    let container =
        DefaultAppContainer::new(config).context("Failed to initialize application")?;

    if config.verify_tools {
        container
            .verify_tools()
            .await
            .context("External tool check failed")?;
    } else {
        info!("Skipping external tool check");
    }

    let interactor = container.conversion_interactor();
    match command {
        Commands::Convert(args) => {
            single(&interactor, args.to_request(), &args.delivery.out_dir).await
        }
        Commands::Trim(args) => single(&interactor, args.to_request(), &args.delivery.out_dir).await,
        Commands::Jpegify(args) => {
            single(&interactor, args.to_request(), &args.delivery.out_dir).await
        }
        Commands::Batch(args) => batch(interactor, &args.file, &args.out_dir).await,
    }
}

async fn single(
    interactor: &ConversionInteractor,
    request: CommandRequest,
    out_dir: &Path,
) -> Result<bool> {
    let reply = interactor.handle(request).await;
    deliver(reply, out_dir, None)
}

/// Run every request of a batch file concurrently, then deliver in file order
pub async fn batch(
    interactor: Arc<ConversionInteractor>,
    file: &Path,
    out_dir: &Path,
) -> Result<bool> {
    let requests = load_batch_file(file)?;
    info!("Running {} requests from {}", requests.len(), file.display());

    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let interactor = Arc::clone(&interactor);
            tokio::spawn(async move { interactor.handle(request).await })
        })
        .collect();

    let mut all_delivered = true;
    for (index, joined) in join_all(handles).await.into_iter().enumerate() {
        let reply = joined.context("Request task panicked")?;
        // Replies commonly share a suggested name, e.g. output.gif.
        all_delivered &= deliver(reply, out_dir, Some(index + 1))?;
    }
    Ok(all_delivered)
}

/// Parse a batch file: YAML for `.yaml`/`.yml`, JSON otherwise
pub fn load_batch_file(path: &Path) -> QuickEditResult<Vec<CommandRequest>> {
    let content = std::fs::read_to_string(path)?;
    let is_yaml = PathUtils::get_extension(&path.to_string_lossy())
        .map_or(false, |ext| ext == "yaml" || ext == "yml");

    let parsed = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| QuickEditError::BatchFileError {
        path: path.to_path_buf(),
        message,
    })
}

/// Hand a reply to the terminal. Returns `true` for a file, `false` for a message.
pub fn deliver(reply: Reply, out_dir: &Path, index: Option<usize>) -> Result<bool> {
    let marker = if reply.ephemeral() { " [ephemeral]" } else { "" };
    match reply {
        Reply::File(payload) => {
            let target = output_path(out_dir, &payload.filename, index);
            std::fs::create_dir_all(out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            std::fs::write(&target, &payload.bytes)
                .with_context(|| format!("Failed to write {}", target.display()))?;

            println!(
                "Wrote {} ({}){}",
                target.display(),
                Utils::format_file_size(payload.bytes.len() as u64),
                marker
            );
            if !payload.caption.is_empty() {
                println!("{}", payload.caption);
            }
            Ok(true)
        }
        Reply::Message { text, .. } => {
            warn!("Request answered with a message");
            eprintln!("{}{}", text, marker);
            Ok(false)
        }
    }
}

fn output_path(out_dir: &Path, suggested: &str, index: Option<usize>) -> PathBuf {
    let name = PathUtils::sanitize_filename(suggested);
    match index {
        Some(index) => out_dir.join(format!("{}-{}", index, name)),
        None => out_dir.join(name),
    }
}
