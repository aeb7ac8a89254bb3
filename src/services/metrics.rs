//! HTTP metrics backed by a `prometheus::Registry`.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `http_requests_total` | Counter | `service`, `method`, `endpoint` |
//! | `http_request_duration_seconds` | Histogram (default buckets) | `service`, `method`, `endpoint` |
//! | `http_request_errors_total` | Counter, 5xx only | `service`, `method`, `endpoint`, `error` |
//!
//! `endpoint` is a route template (`/api/v1/files/{key}`), never a raw path,
//! so the number of series stays bounded by the route table.
use std::time::Duration;

use axum::http::StatusCode;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

const SERVICE: &str = "api";

pub struct HttpMetrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: HistogramVec,
    errors: IntCounterVec,
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics")
            .field("service", &SERVICE)
            .finish_non_exhaustive()
    }
}

impl HttpMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests")
                .const_label("service", SERVICE),
            &["method", "endpoint"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Histogram of response latencies",
            )
            .const_label("service", SERVICE),
            &["method", "endpoint"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new(
                "http_request_errors_total",
                "Total number of HTTP request errors",
            )
            .const_label("service", SERVICE),
            &["method", "endpoint", "error"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            registry,
            requests,
            duration,
            errors,
        })
    }

    /// Record one finished request against its route template.
    pub fn observe(&self, method: &str, endpoint: &str, status: StatusCode, elapsed: Duration) {
        let labels = [method, endpoint];
        self.requests.with_label_values(&labels).inc();
        self.duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());

        if status.is_server_error() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            self.errors
                .with_label_values(&[method, endpoint, reason])
                .inc();
        }
    }

    pub fn requests_total(&self, method: &str, endpoint: &str) -> u64 {
        self.requests
            .get_metric_with_label_values(&[method, endpoint])
            .map_or(0, |c| c.get())
    }

    pub fn errors_total(&self, method: &str, endpoint: &str, reason: &str) -> u64 {
        self.errors
            .get_metric_with_label_values(&[method, endpoint, reason])
            .map_or(0, |c| c.get())
    }

    /// Text exposition of every registered family.
    pub fn render(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Value of the first sample of `name` carrying every `key="value"` label.
    fn sample(text: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        text.lines()
            .filter(|line| line.starts_with(&format!("{name}{{")))
            .find(|line| {
                labels
                    .iter()
                    .all(|(k, v)| line.contains(&format!("{k}=\"{v}\"")))
            })
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    #[test]
    fn counts_requests_per_method_and_endpoint() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.observe("GET", "/a", StatusCode::OK, Duration::from_millis(3));
        metrics.observe("GET", "/a", StatusCode::OK, Duration::from_millis(30));
        metrics.observe("POST", "/a", StatusCode::CREATED, Duration::from_millis(3));

        assert_eq!(metrics.requests_total("GET", "/a"), 2);
        assert_eq!(metrics.requests_total("POST", "/a"), 1);
        assert_eq!(metrics.requests_total("GET", "/b"), 0);
    }

    #[test]
    fn only_server_errors_are_counted_as_errors() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.observe("GET", "/a", StatusCode::NOT_FOUND, Duration::ZERO);
        metrics.observe(
            "GET",
            "/a",
            StatusCode::INTERNAL_SERVER_ERROR,
            Duration::ZERO,
        );
        metrics.observe("GET", "/a", StatusCode::BAD_GATEWAY, Duration::ZERO);

        assert_eq!(metrics.errors_total("GET", "/a", "Internal Server Error"), 1);
        assert_eq!(metrics.errors_total("GET", "/a", "Bad Gateway"), 1);
        assert_eq!(metrics.errors_total("GET", "/a", "Not Found"), 0);
    }

    #[test]
    fn renders_histogram_with_default_buckets() {
        let metrics = HttpMetrics::new().unwrap();
        metrics.observe("GET", "/a", StatusCode::OK, Duration::from_millis(1));
        metrics.observe("GET", "/a", StatusCode::OK, Duration::from_millis(200));
        metrics.observe("GET", "/a", StatusCode::OK, Duration::from_secs(60));

        let text = metrics.render().unwrap();
        let labels = [("service", "api"), ("method", "GET"), ("endpoint", "/a")];

        assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
        assert_eq!(sample(&text, "http_requests_total", &labels), Some(3.0));
        assert_eq!(
            sample(
                &text,
                "http_request_duration_seconds_bucket",
                &[("endpoint", "/a"), ("le", "0.005")]
            ),
            Some(1.0)
        );
        assert_eq!(
            sample(
                &text,
                "http_request_duration_seconds_bucket",
                &[("endpoint", "/a"), ("le", "+Inf")]
            ),
            Some(3.0)
        );
        assert_eq!(
            sample(&text, "http_request_duration_seconds_count", &labels),
            Some(3.0)
        );
    }
}
