//! Request counters exported in the Prometheus text format

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info_span, Instrument};

pub struct Metrics {
    pub http_requests_total: AtomicU64,
    pub http_requests_2xx: AtomicU64,
    pub http_requests_4xx: AtomicU64,
    pub http_requests_5xx: AtomicU64,
    /// 401 and 403 responses, counted again on their own
    pub http_requests_denied: AtomicU64,
    pub http_request_duration_ms_total: AtomicU64,
    pub requests_in_flight: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_requests_2xx: AtomicU64::new(0),
            http_requests_4xx: AtomicU64::new(0),
            http_requests_5xx: AtomicU64::new(0),
            http_requests_denied: AtomicU64::new(0),
            http_request_duration_ms_total: AtomicU64::new(0),
            requests_in_flight: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self, status: StatusCode, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_duration_ms_total
            .fetch_add(duration_ms, Ordering::Relaxed);

        if status.is_success() {
            self.http_requests_2xx.fetch_add(1, Ordering::Relaxed);
        } else if status.is_client_error() {
            self.http_requests_4xx.fetch_add(1, Ordering::Relaxed);
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                self.http_requests_denied.fetch_add(1, Ordering::Relaxed);
            }
        } else if status.is_server_error() {
            self.http_requests_5xx.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn export_prometheus(&self) -> String {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let mut out = String::new();

        let _ = writeln!(out, "# HELP http_requests_total Total number of HTTP requests");
        let _ = writeln!(out, "# TYPE http_requests_total counter");
        let _ = writeln!(out, "http_requests_total {}", load(&self.http_requests_total));

        let _ = writeln!(out, "# HELP http_requests_by_status HTTP requests by status class");
        let _ = writeln!(out, "# TYPE http_requests_by_status counter");
        for (class, counter) in [
            ("2xx", &self.http_requests_2xx),
            ("4xx", &self.http_requests_4xx),
            ("5xx", &self.http_requests_5xx),
        ] {
            let _ = writeln!(out, "http_requests_by_status{{status=\"{}\"}} {}", class, load(counter));
        }

        let _ = writeln!(out, "# HELP http_requests_denied_total Requests answered with 401 or 403");
        let _ = writeln!(out, "# TYPE http_requests_denied_total counter");
        let _ = writeln!(out, "http_requests_denied_total {}", load(&self.http_requests_denied));

        let _ = writeln!(out, "# HELP http_request_duration_ms_total Total HTTP request duration in milliseconds");
        let _ = writeln!(out, "# TYPE http_request_duration_ms_total counter");
        let _ = writeln!(
            out,
            "http_request_duration_ms_total {}",
            load(&self.http_request_duration_ms_total)
        );

        let _ = writeln!(out, "# HELP http_requests_in_flight Requests currently being served");
        let _ = writeln!(out, "# TYPE http_requests_in_flight gauge");
        let _ = writeln!(out, "http_requests_in_flight {}", load(&self.requests_in_flight));

        let _ = writeln!(out, "# HELP uptime_seconds Server uptime in seconds");
        let _ = writeln!(out, "# TYPE uptime_seconds gauge");
        let _ = writeln!(out, "uptime_seconds {}", self.uptime_seconds());

        out
    }
}

pub async fn metrics_middleware(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    metrics.requests_in_flight.fetch_add(1, Ordering::Relaxed);
    let response = next
        .run(request)
        .instrument(info_span!("http_request", %method, %uri))
        .await;
    metrics.requests_in_flight.fetch_sub(1, Ordering::Relaxed);

    let duration = start.elapsed();
    let status = response.status();
    debug!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "request completed"
    );
    metrics.record_request(status, duration.as_millis() as u64);

    response
}

/// GET /metrics
pub async fn prometheus_metrics(State(metrics): State<Arc<Metrics>>) -> String {
    metrics.export_prometheus()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new();
        metrics.record_request(StatusCode::CREATED, 50);
        metrics.record_request(StatusCode::FORBIDDEN, 10);
        metrics.record_request(StatusCode::BAD_REQUEST, 5);
        metrics.record_request(StatusCode::INTERNAL_SERVER_ERROR, 100);

        assert_eq!(metrics.http_requests_total.load(Ordering::Relaxed), 4);
        assert_eq!(metrics.http_requests_2xx.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.http_requests_4xx.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.http_requests_denied.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.http_requests_5xx.load(Ordering::Relaxed), 1);
        assert_eq!(
            metrics.http_request_duration_ms_total.load(Ordering::Relaxed),
            165
        );
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.record_request(StatusCode::OK, 50);

        let output = metrics.export_prometheus();
        assert!(output.contains("http_requests_total 1\n"));
        assert!(output.contains("http_requests_by_status{status=\"2xx\"} 1\n"));
        assert!(output.contains("# TYPE uptime_seconds gauge"));
    }
}
