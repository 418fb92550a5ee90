//! File watching that wakes the refresh loop early.

use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

/// Watches a configuration file and signals when it may have changed.
///
/// The parent directory is watched rather than the file itself so that
/// editors that replace the file through a rename are still seen. Signals
/// are debounced; the receiver is expected to re-check the file's
/// modification time rather than trust each signal.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_json::notify::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (watcher, mut rx) = ConfigWatcher::watch("/etc/app/config.json", Duration::from_millis(100))?;
///
/// while let Some(()) = rx.recv().await {
///     println!("Config file touched, re-checking");
/// }
/// # drop(watcher);
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
    debounce_duration: Duration,
}

impl ConfigWatcher {
    /// Start watching `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The configuration file; it must exist
    /// * `debounce_duration` - Minimum time between signals
    ///
    /// # Returns
    ///
    /// The watcher, which must be kept alive, and a receiver of change signals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadError`] if the path can't be resolved and
    /// [`ConfigError::WatchError`] if the watcher can't be created.
    pub fn watch(
        path: impl AsRef<Path>,
        debounce_duration: Duration,
    ) -> Result<(Self, mpsc::Receiver<()>)> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| ConfigError::LoadError(format!("Failed to resolve path: {}", e)))?;
        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                ConfigError::WatchError(format!("{} has no parent directory", path.display()))
            })?;

        let (tx, rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<()>();

        let target = path.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let relevant = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_)
                ) && event.paths.iter().any(|p| p == &target);
                if relevant {
                    let _ = event_tx.send(());
                }
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;

        // Debounce raw events into reload signals
        let debounce = debounce_duration;
        tokio::spawn(async move {
            let mut last_signal: Option<Instant> = None;

            while event_rx.recv().await.is_some() {
                if let Some(remaining) =
                    last_signal.and_then(|at| debounce.checked_sub(at.elapsed()))
                {
                    sleep(remaining).await;
                }
                // Collapse events that piled up while waiting
                while event_rx.try_recv().is_ok() {}

                if tx.send(()).await.is_err() {
                    break;
                }
                last_signal = Some(Instant::now());
            }
        });

        Ok((
            Self {
                _watcher: watcher,
                path,
                debounce_duration,
            },
            rx,
        ))
    }

    /// The canonical path of the watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the debounce duration for this watcher.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }
}
