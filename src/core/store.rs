//! The reloadable configuration store providing lock-free reads.

use crate::core::{ConfigStoreBuilder, Document, FileLoader, Map, Snapshot, Value};
use crate::error::{ConfigError, Result};
use crate::logging::Logger;
use crate::notify::{SubscriberRegistry, SubscriptionHandle};
use arc_swap::ArcSwap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

#[cfg(feature = "file-watch")]
use crate::notify::ConfigWatcher;
#[cfg(feature = "file-watch")]
use tokio::sync::mpsc;

#[cfg(feature = "metrics")]
use crate::metrics::ReloadMetrics;

/// Type alias for document validators run before a snapshot is published.
pub(crate) type Validator = Arc<dyn Fn(&Document) -> Result<()> + Send + Sync>;

/// A JSON configuration file kept fresh in memory.
///
/// The store owns the current [`Snapshot`] behind an `arc-swap` cell. Readers
/// load it without locking and always see one complete version. A background
/// task re-stats the file on every refresh tick; when the modification time
/// differs from the current snapshot's, the file is read, decoded, validated
/// and published as a whole, and then every subscriber is called. A reload
/// that fails is logged and the previous snapshot stays current.
///
/// The background task stops once every clone of the store has been dropped.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_json::prelude::*;
///
/// # async fn example() -> Result<()> {
/// let store = ConfigStore::builder()
///     .with_file("config.json")
///     .build()
///     .await?;
///
/// let port = store.int64_or("server.port", 8080);
/// let timeout = store.duration("server.timeout");
/// println!("port {} timeout {:?}", port, timeout);
/// # Ok(())
/// # }
/// ```
pub struct ConfigStore {
    inner: Arc<StoreInner>,
}

/// Shared state behind every clone of a [`ConfigStore`].
pub(crate) struct StoreInner {
    /// The current snapshot, replaced wholesale on every reload
    pub(crate) current: ArcSwap<Snapshot>,
    pub(crate) loader: FileLoader,
    pub(crate) validator: Option<Validator>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) subscribers: SubscriberRegistry,
    /// Serializes the background loop and manual reloads so there is one writer at a time
    pub(crate) reload_lock: tokio::sync::Mutex<()>,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Option<ReloadMetrics>,
}

enum ReloadOutcome {
    Published,
    Rejected,
    Failed,
}

impl StoreInner {
    /// Re-stat the file and publish a new snapshot if it changed.
    ///
    /// Returns the task running the subscribers when a snapshot was published.
    async fn refresh(&self) -> Result<Option<JoinHandle<()>>> {
        let _guard = self.reload_lock.lock().await;

        #[cfg(feature = "metrics")]
        self.sample_gauges();

        let modified = self.loader.modified().await?;
        let current = self.current.load_full();
        if current.modified() == modified {
            return Ok(None);
        }

        let timer = self.start_reload();
        let document = match self.loader.load().await {
            Ok(document) => document,
            Err(e) => {
                self.finish_reload(timer, ReloadOutcome::Failed);
                return Err(e);
            }
        };

        if let Some(validator) = &self.validator {
            if let Err(e) = validator(&document) {
                self.finish_reload(timer, ReloadOutcome::Rejected);
                return Err(e);
            }
        }

        self.current.store(Arc::new(Snapshot::new(
            document,
            modified,
            current.version() + 1,
        )));
        self.finish_reload(timer, ReloadOutcome::Published);
        self.logger.info("Configuration is reloaded");

        let subscribers = self.subscribers.clone();
        Ok(Some(tokio::task::spawn_blocking(move || {
            subscribers.notify_all()
        })))
    }

    /// Record the config age and the live subscriber count; returns the count.
    #[cfg(feature = "metrics")]
    fn sample_gauges(&self) -> usize {
        let count = self.subscribers.subscriber_count();
        if let Some(metrics) = &self.metrics {
            metrics.update_config_age();
            metrics.update_subscriber_count(count as i64);
        }
        count
    }

    #[cfg(feature = "metrics")]
    fn start_reload(&self) -> Option<Instant> {
        self.metrics.as_ref().map(ReloadMetrics::start_reload)
    }

    #[cfg(not(feature = "metrics"))]
    fn start_reload(&self) -> Option<Instant> {
        None
    }

    #[cfg(feature = "metrics")]
    fn finish_reload(&self, timer: Option<Instant>, outcome: ReloadOutcome) {
        let (Some(metrics), Some(timer)) = (&self.metrics, timer) else {
            return;
        };
        match outcome {
            ReloadOutcome::Published => metrics.record_reload_success(timer),
            ReloadOutcome::Rejected => {
                metrics.record_validation_failure();
                metrics.record_reload_failure(timer);
            }
            ReloadOutcome::Failed => metrics.record_reload_failure(timer),
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn finish_reload(&self, _timer: Option<Instant>, _outcome: ReloadOutcome) {}
}

/// Wakes the refresh loop on every tick, or earlier on a file-system event.
pub(crate) struct RefreshTrigger {
    ticker: Interval,
    #[cfg(feature = "file-watch")]
    wake: Option<mpsc::Receiver<()>>,
    #[cfg(feature = "file-watch")]
    _watcher: Option<ConfigWatcher>,
}

impl RefreshTrigger {
    /// Create a trigger whose first tick fires one `interval` from now.
    pub(crate) fn new(interval: Duration) -> Self {
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            ticker,
            #[cfg(feature = "file-watch")]
            wake: None,
            #[cfg(feature = "file-watch")]
            _watcher: None,
        }
    }

    /// Also wake on signals from `watcher`.
    #[cfg(feature = "file-watch")]
    pub(crate) fn with_watcher(mut self, watcher: ConfigWatcher, wake: mpsc::Receiver<()>) -> Self {
        self._watcher = Some(watcher);
        self.wake = Some(wake);
        self
    }

    async fn next(&mut self) {
        #[cfg(feature = "file-watch")]
        if let Some(wake) = self.wake.as_mut() {
            let closed = tokio::select! {
                _ = self.ticker.tick() => false,
                signal = wake.recv() => signal.is_none(),
            };
            if closed {
                self.wake = None;
            }
            return;
        }

        self.ticker.tick().await;
    }

    /// Run the refresh loop until the store is dropped.
    pub(crate) fn spawn(mut self, store: Weak<StoreInner>) {
        tokio::spawn(async move {
            loop {
                self.next().await;

                let Some(inner) = store.upgrade() else {
                    break;
                };
                if let Err(e) = inner.refresh().await {
                    inner.logger.error(&e.to_string());
                }
            }
        });
    }
}

macro_rules! typed_getters {
    ($($name:ident, $name_or:ident, $ty:ty, $read:expr;)*) => {
        $(
            #[doc = concat!(
                "Read the value at `path` as `", stringify!($ty),
                "`, returning the type's default when it is missing or can't be coerced."
            )]
            pub fn $name(&self, path: &str) -> $ty {
                self.lookup(path, $read).unwrap_or_default()
            }

            #[doc = concat!(
                "Read the value at `path` as `", stringify!($ty),
                "`, returning `default` when it is missing or can't be coerced."
            )]
            pub fn $name_or(&self, path: &str, default: $ty) -> $ty {
                self.lookup(path, $read).unwrap_or(default)
            }
        )*
    };
}

impl ConfigStore {
    /// Create a new builder for constructing a store.
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<StoreInner>) -> Self {
        Self { inner }
    }

    /// Get a reference-counted handle to the current snapshot.
    ///
    /// Lock-free; the returned snapshot stays valid after later reloads.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.current.load_full()
    }

    /// The absolute path of the configuration file.
    pub fn path(&self) -> &Path {
        self.inner.loader.path()
    }

    /// Check the file now instead of waiting for the next refresh tick.
    ///
    /// Returns `true` when a new snapshot was published, after every
    /// subscriber has run. If the file is unreadable, invalid or rejected by
    /// validation, the previous snapshot is retained.
    ///
    /// # Errors
    ///
    /// Returns the load, parse or validation error that prevented the reload.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use hotswap_json::prelude::*;
    /// # async fn example(store: ConfigStore) -> Result<()> {
    /// if store.reload().await? {
    ///     println!("now at version {}", store.snapshot().version());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn reload(&self) -> Result<bool> {
        match self.inner.refresh().await? {
            Some(callbacks) => {
                if let Err(e) = callbacks.await {
                    self.inner
                        .logger
                        .error(&format!("Refresh callback failed: {}", e));
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Register a callback run after every published reload.
    ///
    /// Callbacks run on the blocking thread pool once the new snapshot is
    /// current, so a slow callback never delays the next refresh tick.
    /// Returns a handle that can be dropped to unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        let handle = self.inner.subscribers.subscribe(callback);
        self.inner.logger.debug("Add callback on refresh");

        #[cfg(feature = "metrics")]
        self.inner.sample_gauges();

        handle
    }

    /// Get the number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.subscriber_count()
    }

    /// Returns true when `path` exists in the current snapshot.
    pub fn exists(&self, path: &str) -> bool {
        self.inner.current.load().exists(path)
    }

    /// Run `read` against the current snapshot, logging the outcome.
    ///
    /// Missing paths and failed coercions are logged as warnings, anything
    /// else as an error.
    ///
    /// # Errors
    ///
    /// Returns whatever `read` returns.
    pub fn lookup<T, F>(&self, path: &str, read: F) -> Result<T>
    where
        F: FnOnce(&Document, &str) -> Result<T>,
    {
        let logger = &self.inner.logger;
        logger.debug(&format!("Try to get value by `{}`", path));

        let snapshot = self.inner.current.load();
        let result = read(snapshot.document(), path);
        match &result {
            Ok(_) => logger.debug(&format!("Value by path `{}` is exist", path)),
            Err(ConfigError::NotFound(_)) => {
                logger.warn(&format!("Value by path `{}` isn't exist", path))
            }
            Err(e @ ConfigError::UnexpectedType(_)) => logger.warn(&e.to_string()),
            Err(e) => logger.error(&format!("Can't read value by path `{}`: {}", path, e)),
        }

        result
    }

    typed_getters! {
        string, string_or, String, |doc: &Document, path: &str| doc.string(path);
        bool, bool_or, bool, |doc: &Document, path: &str| doc.bool(path);
        int32, int32_or, i32, |doc: &Document, path: &str| doc.int32(path);
        uint32, uint32_or, u32, |doc: &Document, path: &str| doc.uint32(path);
        int64, int64_or, i64, |doc: &Document, path: &str| doc.int64(path);
        uint64, uint64_or, u64, |doc: &Document, path: &str| doc.uint64(path);
        float32, float32_or, f32, |doc: &Document, path: &str| doc.float32(path);
        float64, float64_or, f64, |doc: &Document, path: &str| doc.float64(path);
        list, list_or, Vec<String>, |doc: &Document, path: &str| doc.list(path);
        slice, slice_or, Vec<Value>, |doc: &Document, path: &str| doc.slice(path).map(<[Value]>::to_vec);
        array, array_or, Vec<Value>, |doc: &Document, path: &str| doc.array(path).map(<[Value]>::to_vec);
        map, map_or, Map, |doc: &Document, path: &str| doc.map(path).cloned();
        json, json_or, Map, |doc: &Document, path: &str| doc.json(path).cloned();
        duration, duration_or, Duration, |doc: &Document, path: &str| doc.duration(path);
        value, value_or, Value, |doc: &Document, path: &str| doc.get(path).cloned();
    }
}

impl Clone for ConfigStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path())
            .field("version", &self.inner.current.load().version())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CallbackLogger;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    async fn store_with_logger(contents: &str) -> (TempDir, ConfigStore, Arc<Mutex<Vec<String>>>) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, contents).unwrap();

        let warnings = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&warnings);
        let logger = CallbackLogger::new().on_warn(move |msg| sink.lock().unwrap().push(msg.to_string()));

        let store = ConfigStore::builder()
            .with_file(&config_path)
            .with_refresh_interval(Duration::from_secs(3600))
            .with_logger(logger)
            .build()
            .await
            .unwrap();

        (temp_dir, store, warnings)
    }

    #[tokio::test]
    async fn test_typed_getters() {
        let (_dir, store, _) = store_with_logger(
            r#"{"port": 8080, "name": "svc", "ratio": "0.5", "tags": ["a", "b"], "dur": 5}"#,
        )
        .await;

        assert_eq!(store.int64("port"), 8080);
        assert_eq!(store.uint32("port"), 8080);
        assert_eq!(store.string("name"), "svc");
        assert_eq!(store.float64("ratio"), 0.5);
        assert_eq!(store.list("tags"), vec!["a", "b"]);
        assert_eq!(store.slice("tags").len(), 2);
        assert_eq!(store.duration("dur"), Duration::from_secs(5));
        assert_eq!(store.value("port"), Value::Int(8080));
    }

    #[tokio::test]
    async fn test_defaults_on_failure() {
        let (_dir, store, warnings) = store_with_logger(r#"{"name": "svc"}"#).await;

        assert_eq!(store.int64("missing"), 0);
        assert_eq!(store.int64_or("missing", 42), 42);
        assert_eq!(store.int64_or("name", 7), 7);
        assert!(!store.bool("name"));
        assert!(store.map("name").is_empty());
        assert_eq!(store.value("missing"), Value::Null);

        let warnings = warnings.lock().unwrap();
        assert!(warnings.iter().any(|w| w.contains("`missing` isn't exist")));
        assert!(warnings.iter().any(|w| w.contains("`name`")));
    }

    #[tokio::test]
    async fn test_reload_without_change() {
        let (_dir, store, _) = store_with_logger(r#"{"a": 1}"#).await;
        assert!(!store.reload().await.unwrap());
        assert_eq!(store.snapshot().version(), 1);
    }

    #[cfg(feature = "metrics")]
    #[tokio::test]
    async fn test_subscriber_gauge_follows_unsubscribe() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"a": 1}"#).unwrap();

        let store = ConfigStore::builder()
            .with_file(&config_path)
            .with_refresh_interval(Duration::from_secs(3600))
            .with_metrics(opentelemetry::global::meter("test"))
            .build()
            .await
            .unwrap();

        let handle = store.subscribe(|| {});
        assert_eq!(store.inner.sample_gauges(), 1);

        drop(handle);
        assert_eq!(store.inner.sample_gauges(), 0);

        // Every refresh tick samples the gauges, changed file or not
        assert!(!store.reload().await.unwrap());
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let (_dir, store, _) = store_with_logger(r#"{"a": 1}"#).await;
        let store2 = store.clone();

        let _handle = store.subscribe(|| {});
        assert_eq!(store2.subscriber_count(), 1);
        assert!(Arc::ptr_eq(&store.snapshot(), &store2.snapshot()));
    }
}
