//! Built-in metrics for the reload loop.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Reload attempts/success/failures
//! - Reload duration
//! - Configuration age
//! - Active subscribers
//! - Validation failures
//!
//! # Examples
//!
//! ```rust,no_run
//! use hotswap_json::prelude::*;
//! use opentelemetry::global;
//!
//! # async fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let store = ConfigStore::builder()
//!     .with_file("config.json")
//!     .with_metrics(meter)
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod reload_metrics;

pub use reload_metrics::ReloadMetrics;
