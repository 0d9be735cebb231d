//! Debounced watcher over one digest directory

use crate::error::{WatchError, WatchResult};
use crate::matcher::DigestMatcher;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Where and what to watch
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub directory: PathBuf,
    pub pattern: String,
    pub debounce: Duration,
    pub recursive: bool,
}

/// Sends the path of every created or modified digest file to a channel
///
/// Watching stops when the watcher is dropped.
pub struct DigestWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl DigestWatcher {
    pub fn start(options: WatchOptions, sender: mpsc::UnboundedSender<PathBuf>) -> WatchResult<Self> {
        if !options.directory.is_dir() {
            return Err(WatchError::NotADirectory(options.directory));
        }
        let matcher = DigestMatcher::new(&options.pattern)?;

        let mut debouncer = new_debouncer(options.debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let paths: BTreeSet<PathBuf> = events
                        .iter()
                        .flat_map(|event| digest_paths(&event.event, &matcher))
                        .collect();
                    for path in paths {
                        debug!(path = %path.display(), "Digest file changed");
                        if let Err(e) = sender.send(path) {
                            error!("Failed to send digest path: {}", e);
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        error!("Notify error: {:?}", error);
                    }
                }
            }
        })?;

        let mode = if options.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watch(&options.directory, mode)?;

        info!(
            dir = %options.directory.display(),
            pattern = %options.pattern,
            debounce_ms = options.debounce.as_millis() as u64,
            recursive = options.recursive,
            "Watching digest directory"
        );

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Matching file paths touched by a create or modify event
pub fn digest_paths(event: &Event, matcher: &DigestMatcher) -> Vec<PathBuf> {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|path| matcher.matches(path) && path.is_file())
        .cloned()
        .collect()
}
