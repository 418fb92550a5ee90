//! Reload metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for the reload loop.
///
/// Only reloads triggered by a changed modification time are counted; ticks
/// that find the file untouched are not attempts.
///
/// # Examples
///
/// ```rust,no_run
/// use hotswap_json::metrics::ReloadMetrics;
/// use opentelemetry::global;
///
/// let metrics = ReloadMetrics::new(global::meter("hotswap-json"));
///
/// let timer = metrics.start_reload();
/// // ... read, decode and publish ...
/// metrics.record_reload_success(timer);
/// ```
#[derive(Clone)]
pub struct ReloadMetrics {
    reload_attempts: Counter<u64>,
    reload_success: Counter<u64>,
    reload_failures: Counter<u64>,
    reload_duration: Histogram<f64>,
    config_age_seconds: Gauge<i64>,
    active_subscribers: Gauge<i64>,
    validation_failures: Counter<u64>,
    last_update: Arc<parking_lot::Mutex<Instant>>,
}

impl ReloadMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let reload_attempts = meter
            .u64_counter("hotswap_json.reload.attempts")
            .with_description("Number of reloads started after a file change")
            .build();

        let reload_success = meter
            .u64_counter("hotswap_json.reload.success")
            .with_description("Number of reloads that published a new snapshot")
            .build();

        let reload_failures = meter
            .u64_counter("hotswap_json.reload.failures")
            .with_description("Number of reloads that kept the previous snapshot")
            .build();

        let reload_duration = meter
            .f64_histogram("hotswap_json.reload.duration")
            .with_description("Duration of reload operations in seconds")
            .with_unit("s")
            .build();

        let config_age_seconds = meter
            .i64_gauge("hotswap_json.age")
            .with_description("Time since the current snapshot was published in seconds")
            .with_unit("s")
            .build();

        let active_subscribers = meter
            .i64_gauge("hotswap_json.subscribers.active")
            .with_description("Number of registered refresh callbacks")
            .build();

        let validation_failures = meter
            .u64_counter("hotswap_json.validation.failures")
            .with_description("Number of reloaded documents rejected by validation")
            .build();

        Self {
            reload_attempts,
            reload_success,
            reload_failures,
            reload_duration,
            config_age_seconds,
            active_subscribers,
            validation_failures,
            last_update: Arc::new(parking_lot::Mutex::new(Instant::now())),
        }
    }

    /// Count a reload attempt and start its timer.
    pub fn start_reload(&self) -> Instant {
        self.reload_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a reload that published a new snapshot.
    pub fn record_reload_success(&self, start: Instant) {
        let duration = start.elapsed().as_secs_f64();
        self.reload_success.add(1, &[]);
        self.reload_duration.record(duration, &[]);

        *self.last_update.lock() = Instant::now();
    }

    /// Record a reload that kept the previous snapshot.
    pub fn record_reload_failure(&self, start: Instant) {
        let duration = start.elapsed().as_secs_f64();
        self.reload_failures.add(1, &[]);
        self.reload_duration.record(duration, &[]);
    }

    /// Record a document rejected by validation.
    pub fn record_validation_failure(&self) {
        self.validation_failures.add(1, &[]);
    }

    /// Update the number of registered refresh callbacks.
    pub fn update_subscriber_count(&self, count: i64) {
        self.active_subscribers.record(count, &[]);
    }

    /// Update the configuration age gauge; called on every refresh tick.
    pub fn update_config_age(&self) {
        let age_secs = self.last_update.lock().elapsed().as_secs() as i64;
        self.config_age_seconds.record(age_secs, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::global;

    #[test]
    fn test_metrics_creation() {
        let metrics = ReloadMetrics::new(global::meter("test"));

        let timer = metrics.start_reload();
        metrics.record_reload_success(timer);

        let timer = metrics.start_reload();
        metrics.record_validation_failure();
        metrics.record_reload_failure(timer);

        metrics.update_subscriber_count(5);
        metrics.update_config_age();
    }

    #[test]
    fn test_metrics_clone() {
        let metrics = ReloadMetrics::new(global::meter("test"));
        let metrics2 = metrics.clone();

        let timer1 = metrics.start_reload();
        let timer2 = metrics2.start_reload();

        metrics.record_reload_success(timer1);
        metrics2.record_reload_success(timer2);
    }
}
