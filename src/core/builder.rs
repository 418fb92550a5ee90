//! Builder for constructing ConfigStore instances.

use crate::core::store::{RefreshTrigger, StoreInner, Validator};
use crate::core::{ConfigStore, Document, FileLoader, Snapshot};
use crate::error::{ConfigError, Result};
use crate::logging::{Logger, TracingLogger};
use crate::notify::SubscriberRegistry;
use crate::schema::Checker;
use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "file-watch")]
use crate::notify::ConfigWatcher;

#[cfg(feature = "metrics")]
use crate::metrics::ReloadMetrics;

/// Default time between modification-time checks.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest refresh interval accepted by the builder.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Builder for constructing a [`ConfigStore`].
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_json::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let checker = Checker::new(
///     br#"{"server": {"port": {"required": true, "type": "uint32"}}}"#,
///     &Handlers::new(),
/// )?;
///
/// let store = ConfigStore::builder()
///     .with_file("config/app.json")
///     .with_refresh_interval(Duration::from_millis(500))
///     .with_checker(checker)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigStoreBuilder {
    file_path: Option<PathBuf>,
    refresh_interval: Duration,
    logger: Arc<dyn Logger>,
    validator: Option<Validator>,
    subscribers: Option<SubscriberRegistry>,
    #[cfg(feature = "file-watch")]
    file_watch: bool,
    #[cfg(feature = "file-watch")]
    watch_debounce: Duration,
    #[cfg(feature = "metrics")]
    metrics: Option<ReloadMetrics>,
}

impl ConfigStoreBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            file_path: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            logger: Arc::new(TracingLogger),
            validator: None,
            subscribers: None,
            #[cfg(feature = "file-watch")]
            file_watch: false,
            #[cfg(feature = "file-watch")]
            watch_debounce: Duration::from_millis(100),
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Set the JSON file to load and watch.
    ///
    /// Relative paths are resolved against the current directory when the
    /// store is built.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set the time between modification-time checks (default: 1s).
    ///
    /// Intervals shorter than one millisecond are raised to one millisecond.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval.max(MIN_REFRESH_INTERVAL);
        self
    }

    /// Set the logger that receives lifecycle and lookup messages.
    ///
    /// Defaults to [`TracingLogger`].
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Add a validation function every document must pass before it is published.
    ///
    /// A failure during [`build`](Self::build) fails the build; a failure
    /// during a reload keeps the previous snapshot.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hotswap_json::prelude::*;
    ///
    /// # async fn example() -> Result<()> {
    /// let store = ConfigStore::builder()
    ///     .with_file("config.json")
    ///     .with_validation(|doc: &Document| {
    ///         if doc.int64("server.port")? < 1024 {
    ///             return Err(ConfigError::UnexpectedValue("port must be >= 1024".into()));
    ///         }
    ///         Ok(())
    ///     })
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Document) -> Result<()> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Validate every document against a compiled schema before it is published.
    pub fn with_checker(self, checker: Checker) -> Self {
        self.with_validation(move |document: &Document| checker.check(document))
    }

    /// Use an existing subscriber registry, so callbacks can be registered
    /// before the store exists.
    pub fn with_subscribers(mut self, subscribers: SubscriberRegistry) -> Self {
        self.subscribers = Some(subscribers);
        self
    }

    /// Wake the refresh loop on file-system events as well as on every tick.
    #[cfg(feature = "file-watch")]
    pub fn with_file_watch(mut self, enabled: bool) -> Self {
        self.file_watch = enabled;
        self
    }

    /// Set the debounce applied to file-system events (default: 100ms).
    #[cfg(feature = "file-watch")]
    pub fn with_watch_debounce(mut self, debounce: Duration) -> Self {
        self.watch_debounce = debounce;
        self
    }

    /// Record reload metrics with the provided meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(ReloadMetrics::new(meter));
        self
    }

    /// Build the store.
    ///
    /// Performs the initial load and validation, then starts the refresh loop
    /// on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No file was specified
    /// - The file is missing or unreadable
    /// - The file isn't a JSON object
    /// - Validation fails
    /// - File watching was requested and can't be started
    pub async fn build(self) -> Result<ConfigStore> {
        let file_path = self.file_path.ok_or_else(|| {
            ConfigError::LoadError("No configuration file specified".to_string())
        })?;
        let file_path = std::path::absolute(&file_path)?;

        self.logger.info("Configuration is initialized");

        let loader = FileLoader::new(file_path);
        let modified = loader.modified().await?;
        let document = loader.load().await?;

        if let Some(validator) = &self.validator {
            validator(&document)?;
        }

        self.logger.info("Configuration is loaded");

        let trigger = RefreshTrigger::new(self.refresh_interval);

        #[cfg(feature = "file-watch")]
        let trigger = if self.file_watch {
            let (watcher, wake) = ConfigWatcher::watch(loader.path(), self.watch_debounce)?;
            trigger.with_watcher(watcher, wake)
        } else {
            trigger
        };

        let inner = Arc::new(StoreInner {
            current: ArcSwap::from_pointee(Snapshot::new(document, modified, 1)),
            loader,
            validator: self.validator,
            logger: self.logger,
            subscribers: self.subscribers.unwrap_or_default(),
            reload_lock: tokio::sync::Mutex::new(()),
            #[cfg(feature = "metrics")]
            metrics: self.metrics,
        });

        trigger.spawn(Arc::downgrade(&inner));

        Ok(ConfigStore::from_inner(inner))
    }
}

impl Default for ConfigStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
