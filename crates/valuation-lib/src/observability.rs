//! Observability for the valuation service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction and error counts, model info)
//! - Structured event logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Histogram buckets for model load time (in seconds)
const LOAD_BUCKETS: &[f64] = &[0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ValuationMetricsInner> = OnceLock::new();

struct ValuationMetricsInner {
    prediction_latency_seconds: Histogram,
    model_load_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounterVec,
    model_info: GaugeVec,
}

impl ValuationMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "valuation_prediction_latency_seconds",
                "Time spent running the valuation model for one record",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            model_load_seconds: register_histogram!(
                "valuation_model_load_seconds",
                "Time spent loading the model artifact",
                LOAD_BUCKETS.to_vec()
            )
            .expect("Failed to register model_load_seconds"),

            predictions_total: register_int_counter!(
                "valuation_predictions_total",
                "Total number of successful valuations"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "valuation_prediction_errors_total",
                "Total number of rejected valuation requests",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            model_info: register_gauge_vec!(
                "valuation_model_info",
                "Information about the loaded valuation model",
                &["name", "version", "estimator"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide valuation metrics
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct ValuationMetrics {
    _private: (),
}

impl Default for ValuationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationMetrics {
    /// Create a handle, registering the collectors on first call
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ValuationMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ValuationMetricsInner {
        GLOBAL_METRICS.get_or_init(ValuationMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn observe_model_load(&self, duration_secs: f64) {
        self.inner().model_load_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    /// Count a rejected request by error kind (e.g. `unknown_category`)
    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn predictions(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn set_model_info(&self, name: &str, version: &str, estimator: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[name, version, estimator])
            .set(1.0);
    }
}

/// Structured logger for valuation events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, artifact: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            service_version = %version,
            artifact = %artifact,
            "Valuation service started"
        );
    }

    pub fn log_model_loaded(&self, name: &str, version: &str, estimator: &str, elapsed_ms: u64) {
        info!(
            event = "model_loaded",
            service = %self.service,
            model = %name,
            model_version = %version,
            estimator = %estimator,
            elapsed_ms = elapsed_ms,
            "Valuation model loaded"
        );
    }

    pub fn log_prediction(
        &self,
        area: f64,
        price_per_sqft: f64,
        estimated_value: f64,
        elapsed_us: u64,
    ) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            area = area,
            price_per_sqft = price_per_sqft,
            estimated_value = estimated_value,
            elapsed_us = elapsed_us,
            "Generated property valuation"
        );
    }

    pub fn log_prediction_failed(&self, kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            kind = %kind,
            error = %error,
            "Valuation request rejected"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Valuation service shutting down"
        );
    }
}
