//! Injectable logging capability.
//!
//! The store reports lifecycle events (initialized, loaded, reloaded, reload
//! failures) and lookup outcomes through a [`Logger`] supplied at build time.
//! The default [`TracingLogger`] forwards to `tracing`, which stays silent
//! until the host application installs a subscriber.

use std::fmt;

/// Target used for every event emitted by [`TracingLogger`].
pub const LOG_TARGET: &str = "hotswap_json";

/// Sink for log messages emitted by the store.
pub trait Logger: Send + Sync {
    /// Record a debug-level message.
    fn debug(&self, message: &str);

    /// Record an info-level message.
    fn info(&self, message: &str);

    /// Record a warning.
    fn warn(&self, message: &str);

    /// Record an error.
    fn error(&self, message: &str);
}

/// Forwards messages to the `tracing` macros under [`LOG_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: LOG_TARGET, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: LOG_TARGET, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: LOG_TARGET, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: LOG_TARGET, "{}", message);
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

type Sink = Box<dyn Fn(&str) + Send + Sync>;

/// Routes each level to its own closure. Levels without a closure are dropped.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::logging::{CallbackLogger, Logger};
///
/// let logger = CallbackLogger::new()
///     .on_warn(|msg| eprintln!("config warning: {}", msg))
///     .on_error(|msg| eprintln!("config error: {}", msg));
///
/// logger.warn("Value by path `server.port` isn't exist");
/// logger.debug("dropped");
/// ```
#[derive(Default)]
pub struct CallbackLogger {
    debug: Option<Sink>,
    info: Option<Sink>,
    warn: Option<Sink>,
    error: Option<Sink>,
}

impl CallbackLogger {
    /// Create a logger with no sinks attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug sink.
    pub fn on_debug(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.debug = Some(Box::new(sink));
        self
    }

    /// Set the info sink.
    pub fn on_info(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.info = Some(Box::new(sink));
        self
    }

    /// Set the warning sink.
    pub fn on_warn(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.warn = Some(Box::new(sink));
        self
    }

    /// Set the error sink.
    pub fn on_error(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(sink));
        self
    }
}

impl Logger for CallbackLogger {
    fn debug(&self, message: &str) {
        if let Some(sink) = &self.debug {
            sink(message);
        }
    }

    fn info(&self, message: &str) {
        if let Some(sink) = &self.info {
            sink(message);
        }
    }

    fn warn(&self, message: &str) {
        if let Some(sink) = &self.warn {
            sink(message);
        }
    }

    fn error(&self, message: &str) {
        if let Some(sink) = &self.error {
            sink(message);
        }
    }
}

impl fmt::Debug for CallbackLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackLogger")
            .field("debug", &self.debug.is_some())
            .field("info", &self.info.is_some())
            .field("warn", &self.warn.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callback_logger_routes_levels() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let warn_seen = Arc::clone(&seen);
        let error_seen = Arc::clone(&seen);
        let logger = CallbackLogger::new()
            .on_warn(move |msg| warn_seen.lock().unwrap().push(format!("warn:{}", msg)))
            .on_error(move |msg| error_seen.lock().unwrap().push(format!("error:{}", msg)));

        logger.debug("ignored");
        logger.info("ignored");
        logger.warn("missing");
        logger.error("broken");

        assert_eq!(*seen.lock().unwrap(), vec!["warn:missing", "error:broken"]);
    }

    #[test]
    fn test_tracing_and_noop_loggers_accept_messages() {
        let loggers: Vec<Box<dyn Logger>> = vec![Box::new(TracingLogger), Box::new(NoopLogger)];
        for logger in &loggers {
            logger.debug("debug");
            logger.info("info");
            logger.warn("warn");
            logger.error("error");
        }
    }
}
