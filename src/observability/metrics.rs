//! Metrics collection and exposition.
//!
//! Prometheus recorder plus the per-request recording helper. The handle is
//! rendered by the app's `/metrics` route so the excluded-path rules apply to
//! the same server that serves traffic.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and describe the request series.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_histogram!(
        "frontend_http_request_duration_seconds",
        "Latency of frontend HTTP requests"
    );
    describe_counter!(
        "frontend_http_request_errors_total",
        "Total frontend HTTP request errors"
    );

    Ok(handle)
}

/// Record one completed request. The route label is the matched template
/// (e.g. `/time`), not the raw path, so per-endpoint series aggregate across
/// query strings. Any status >= 400 also counts as an error.
pub fn record_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.to_string()),
    ];

    histogram!("frontend_http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 400 {
        counter!("frontend_http_request_errors_total", &labels).increment(1);
    }
}
