//! Process-wide configuration.
//!
//! A thin façade over one [`ConfigStore`] for code that prefers free
//! functions to passing a store around. [`init`] loads the file and starts
//! the refresh loop; every getter reads the current snapshot of that store.
//!
//! Getters never fail. A missing path, a value that can't be coerced or a
//! call made before [`init`] all return the type's default (or the supplied
//! default for the `*_or` variants) and log a warning.
//!
//! ```rust,no_run
//! use hotswap_json::global;
//!
//! # async fn example() -> hotswap_json::error::Result<()> {
//! global::init("config/app.json").await?;
//! global::refresh(|| println!("configuration reloaded"));
//!
//! let port = global::uint32_or("server.port", 8080);
//! let hosts = global::list("server.hosts");
//! # Ok(())
//! # }
//! ```

use crate::core::{ConfigStore, ConfigStoreBuilder, Map, Value};
use crate::error::Result;
use crate::logging::LOG_TARGET;
use crate::notify::SubscriberRegistry;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::OnceCell;

static STORE: OnceCell<ConfigStore> = OnceCell::const_new();

// Callbacks registered before `init` land here and are handed to the store.
static SUBSCRIBERS: LazyLock<SubscriberRegistry> = LazyLock::new(SubscriberRegistry::new);

/// Load `path` and start watching it.
///
/// Only the first successful call has an effect; later calls return `Ok(())`
/// without touching the store. A failed call leaves the façade uninitialized,
/// so it can be retried.
///
/// # Errors
///
/// Returns the load, parse or watch error of the initial load.
pub async fn init(path: impl Into<PathBuf>) -> Result<()> {
    init_with(ConfigStore::builder().with_file(path)).await
}

/// Like [`init`], with full control over the store's options.
///
/// # Errors
///
/// Returns the error of [`ConfigStoreBuilder::build`].
pub async fn init_with(builder: ConfigStoreBuilder) -> Result<()> {
    STORE
        .get_or_try_init(|| builder.with_subscribers(SUBSCRIBERS.clone()).build())
        .await?;
    Ok(())
}

/// The store behind the façade, once [`init`] has succeeded.
pub fn store() -> Option<&'static ConfigStore> {
    STORE.get()
}

/// Register a callback run after every reload for the rest of the process.
///
/// May be called before [`init`].
pub fn refresh<F>(callback: F)
where
    F: Fn() + Send + Sync + 'static,
{
    match STORE.get() {
        Some(store) => store.subscribe(callback).detach(),
        None => SUBSCRIBERS.subscribe(callback).detach(),
    }
}

/// Returns true when `path` exists in the current configuration.
pub fn exist(path: &str) -> bool {
    STORE.get().is_some_and(|store| store.exists(path))
}

fn uninitialized(path: &str) {
    tracing::warn!(
        target: LOG_TARGET,
        "Configuration isn't initialized, can't read `{}`",
        path
    );
}

macro_rules! facade_getters {
    ($($name:ident, $name_or:ident, $ty:ty;)*) => {
        $(
            #[doc = concat!(
                "Read the value at `path` as `", stringify!($ty),
                "`, returning the type's default on failure."
            )]
            pub fn $name(path: &str) -> $ty {
                match STORE.get() {
                    Some(store) => store.$name(path),
                    None => {
                        uninitialized(path);
                        <$ty>::default()
                    }
                }
            }

            #[doc = concat!(
                "Read the value at `path` as `", stringify!($ty),
                "`, returning `default` on failure."
            )]
            pub fn $name_or(path: &str, default: $ty) -> $ty {
                match STORE.get() {
                    Some(store) => store.$name_or(path, default),
                    None => {
                        uninitialized(path);
                        default
                    }
                }
            }
        )*
    };
}

facade_getters! {
    string, string_or, String;
    bool, bool_or, bool;
    int32, int32_or, i32;
    uint32, uint32_or, u32;
    int64, int64_or, i64;
    uint64, uint64_or, u64;
    float32, float32_or, f32;
    float64, float64_or, f64;
    list, list_or, Vec<String>;
    slice, slice_or, Vec<Value>;
    array, array_or, Vec<Value>;
    map, map_or, Map;
    json, json_or, Map;
    duration, duration_or, Duration;
    value, value_or, Value;
}
