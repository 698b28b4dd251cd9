//! Watch trigger - reruns a task when watched files change
//!
//! Filesystem notifications are debounced so that one save produces one
//! batch. Batches that arrive while a run is in progress are coalesced into
//! a single follow-up run; runs never overlap.

use crate::{core::StepError, tools::sources::relative_string};
use glob::{MatchOptions, Pattern};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default quiet period before a batch of changes is delivered
pub const DEBOUNCE: Duration = Duration::from_millis(250);

/// Decides which changed paths trigger a run
#[derive(Debug, Clone)]
pub struct WatchTrigger {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl WatchTrigger {
    /// `files` are globs relative to `root`
    pub fn new(root: &Path, files: &[String]) -> Result<Self, StepError> {
        let patterns = files
            .iter()
            .map(|f| {
                // `dir/**` means every file below `dir`
                let glob = if f.ends_with("**") {
                    format!("{}/*", f)
                } else {
                    f.clone()
                };
                Pattern::new(&glob).map_err(|e| StepError::InvalidPattern {
                    pattern: f.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Notifications carry absolute paths
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        Ok(Self { root, patterns })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if a changed path is watched
    pub fn matches(&self, path: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(relative) => relative_string(relative, Path::new("")),
                Err(_) => return false,
            }
        } else {
            relative_string(path, Path::new(""))
        };
        self.patterns
            .iter()
            .any(|p| p.matches_with(&relative, options))
    }

    /// Check if any path in a batch is watched
    pub fn any_match(&self, paths: &[PathBuf]) -> bool {
        paths.iter().any(|p| self.matches(p))
    }
}

/// Start watching `root` recursively.
///
/// The returned debouncer must be kept alive for as long as batches should
/// be delivered.
pub fn watch(
    root: &Path,
    debounce: Duration,
) -> Result<(Debouncer<RecommendedWatcher>, mpsc::Receiver<Vec<PathBuf>>), notify::Error> {
    let (tx, rx) = mpsc::channel(100);

    let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| match res {
        Ok(events) => {
            let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
            let _ = tx.blocking_send(paths);
        }
        Err(e) => warn!("Watch error: {:?}", e),
    })?;

    debouncer.watcher().watch(root, RecursiveMode::Recursive)?;
    info!("Watching {}", root.display());

    Ok((debouncer, rx))
}

/// Run `run` once per batch of watched changes until the channel closes.
///
/// `run` reports whether the build succeeded; a failed build does not stop
/// the loop. Returns the number of runs started.
pub async fn watch_loop<F, Fut>(
    trigger: &WatchTrigger,
    rx: &mut mpsc::Receiver<Vec<PathBuf>>,
    mut run: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut runs = 0;

    while let Some(batch) = rx.recv().await {
        if !trigger.any_match(&batch) {
            debug!("Ignoring {} unwatched change(s)", batch.len());
            continue;
        }

        loop {
            runs += 1;
            info!("Change detected, starting run {}", runs);
            if !run().await {
                warn!("Run {} failed, waiting for changes", runs);
            }

            // Everything that arrived during the run collapses into one rerun
            let mut pending = false;
            while let Ok(batch) = rx.try_recv() {
                pending |= trigger.any_match(&batch);
            }
            if !pending {
                break;
            }
        }
    }

    runs
}
