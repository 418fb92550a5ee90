//! # hotswap-json
//!
//! Hot-reloading JSON configuration with path-addressed typed reads and
//! declarative schema validation.
//!
//! ## Overview
//!
//! `hotswap-json` keeps one JSON configuration file fresh in memory:
//! - Lock-free reads of the current snapshot using `arc-swap`
//! - Dotted-path lookups (`server.tls.port`) with typed coercion
//! - A background loop that reloads the file when its modification time changes
//! - Failed reloads keep the last good configuration
//! - Callbacks fired after every published reload
//! - A JSON rule-schema compiled once and checked against any document
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotswap_json::prelude::*;
//!
//! # async fn example() -> hotswap_json::error::Result<()> {
//! let checker = Checker::new(
//!     br#"{"server": {"port": {"required": true, "type": "uint32"}}}"#,
//!     &Handlers::new(),
//! )?;
//!
//! let store = ConfigStore::builder()
//!     .with_file("config/app.json")
//!     .with_checker(checker)
//!     .build()
//!     .await?;
//!
//! // Lock-free reads, defaulting when the path is missing
//! let port = store.uint32_or("server.port", 8080);
//! println!("Server port: {}", port);
//!
//! let _handle = store.subscribe(|| println!("configuration reloaded"));
//! # Ok(())
//! # }
//! ```
//!
//! For process-wide access without passing a store around, see [`global`].
//!
//! ## Feature Flags
//!
//! - `file-watch` (default): wake the refresh loop on file-system events
//! - `metrics`: OpenTelemetry reload metrics

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod global;
pub mod logging;
pub mod notify;
pub mod schema;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigStore, ConfigStoreBuilder, Document, Map, Snapshot, Value};
    pub use crate::error::{ConfigError, Result, ValidationError};
    pub use crate::logging::{CallbackLogger, Logger, NoopLogger, TracingLogger};
    pub use crate::notify::SubscriptionHandle;
    pub use crate::schema::{Checker, Handlers};
}
