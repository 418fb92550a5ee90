//! Reload notifications.
//!
//! Provides the subscriber registry fired after each published reload and,
//! with the `file-watch` feature, a file watcher that wakes the refresh loop.

pub mod subscriber;

#[cfg(feature = "file-watch")]
pub mod watcher;

pub use subscriber::{SubscriberRegistry, SubscriptionHandle};

#[cfg(feature = "file-watch")]
pub use watcher::ConfigWatcher;
