use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::StageFlags;
use crate::commands::ingest::pipeline_config;
use crate::context::AppContext;
use lexicard_watch::{scan_existing, DigestWatcher, WatchOptions};

/// Execute watch command
///
/// Digests already in the directory are processed first. Events are then
/// handled one at a time until Ctrl-C.
pub async fn execute(context: &AppContext, dir: Option<PathBuf>, stages: StageFlags) -> Result<()> {
    let watch = &context.config.watch;
    let directory = dir
        .or_else(|| watch.directory.clone())
        .context("No directory to watch: pass one or set watch.directory in the config")?;

    let pipeline = context.pipeline(pipeline_config(false, stages));

    let existing = scan_existing(&directory, &watch.pattern, watch.recursive)
        .with_context(|| format!("Failed to scan '{}'", directory.display()))?;
    info!(count = existing.len(), dir = %directory.display(), "Processing existing digests");
    for path in &existing {
        if let Err(e) = pipeline.process(path).await {
            warn!(path = %path.display(), error = ?e, "Failed to process existing digest");
        }
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let _watcher = DigestWatcher::start(
        WatchOptions {
            directory: directory.clone(),
            pattern: watch.pattern.clone(),
            debounce: Duration::from_millis(watch.debounce_ms),
            recursive: watch.recursive,
        },
        tx,
    )
    .with_context(|| format!("Failed to watch '{}'", directory.display()))?;

    println!("Watching {} for {} (Ctrl-C to stop)", directory.display(), watch.pattern);

    tokio::select! {
        handled = pipeline.run(rx) => {
            info!(handled, "Watch channel closed");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Stopping watcher");
        }
    }

    Ok(())
}
