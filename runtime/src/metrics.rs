//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for the request runtime:
//! - Requests issued and their outcome (success, logical error, transport error)
//! - Settlements discarded by the liveness or supersession guard
//! - Request latency
//! - Reducer execution
//!
//! # Example
//!
//! ```rust,no_run
//! use composable_request_runtime::metrics::PrometheusMetrics;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut metrics = PrometheusMetrics::new();
//! metrics.install()?;
//!
//! // Serve this text on a /metrics endpoint
//! let scrape = metrics.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder for the request runtime.
///
/// Installs the global recorder and renders the scrape text. Serving that
/// text over HTTP is left to the host application.
#[derive(Default)]
pub struct PrometheusMetrics {
    handle: Option<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Create an uninstalled recorder
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., in tests), this logs a
    /// warning and succeeds without a handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus metrics recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this instance did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!("request_issued_total", "Total number of requests issued");
    describe_counter!(
        "request_succeeded_total",
        "Total number of requests settled as success"
    );
    describe_counter!(
        "request_logical_errors_total",
        "Total number of transported responses classified as logical errors"
    );
    describe_counter!(
        "request_transport_errors_total",
        "Total number of requests failed by the HTTP collaborator"
    );
    describe_counter!(
        "request_settlements_discarded_total",
        "Total number of settlements dropped by the liveness or supersession guard"
    );
    describe_histogram!(
        "request_duration_seconds",
        "Time from issuing a request to its settlement"
    );
    describe_counter!(
        "reducer_actions_processed_total",
        "Total number of actions processed by reducers"
    );
    describe_histogram!(
        "reducer_execution_duration_seconds",
        "Time spent in reducer execution"
    );
}

/// Request lifecycle metrics recorder.
pub struct RequestMetrics;

impl RequestMetrics {
    /// Record a request issued.
    pub fn record_issued() {
        counter!("request_issued_total").increment(1);
    }

    /// Record a successful settlement.
    pub fn record_success(duration: Duration) {
        counter!("request_succeeded_total").increment(1);
        histogram!("request_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a logical error.
    pub fn record_logical_error(duration: Duration) {
        counter!("request_logical_errors_total").increment(1);
        histogram!("request_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a transport error.
    pub fn record_transport_error(duration: Duration) {
        counter!("request_transport_errors_total").increment(1);
        histogram!("request_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a discarded settlement.
    pub fn record_discarded() {
        counter!("request_settlements_discarded_total").increment(1);
    }
}

/// Reducer metrics recorder.
pub struct ReducerMetrics;

impl ReducerMetrics {
    /// Record an action processed.
    pub fn record_action(duration: Duration) {
        counter!("reducer_actions_processed_total").increment(1);
        histogram!("reducer_execution_duration_seconds").record(duration.as_secs_f64());
    }
}
