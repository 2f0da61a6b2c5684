//! Prometheus metrics for monitoring API performance and scheduling activity.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
pub use metrics_exporter_prometheus::PrometheusHandle;
use mth_srs::Quality;
use regex::Regex;

static NUMERIC_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/\d+").ok());

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new()
        // Request duration, in seconds
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        // Cards per built session
        .set_buckets_for_metric(
            Matcher::Full("srs_session_size".to_string()),
            &[0.0, 1.0, 5.0, 10.0, 15.0, 20.0, 30.0, 50.0, 100.0],
        )?;

    let handle = builder.install_recorder()?;

    Ok(handle)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    gauge!("http_requests_in_flight", "method" => method.clone(), "path" => path.clone())
        .increment(1.0);

    let response = next.run(req).await;

    gauge!("http_requests_in_flight", "method" => method.clone(), "path" => path.clone())
        .decrement(1.0);

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Replace numeric path segments with a placeholder to keep label cardinality low
fn normalize_path(path: &str) -> String {
    match NUMERIC_SEGMENT.as_ref() {
        Some(regex) => regex.replace_all(path, "/:id").into_owned(),
        None => path.to_string(),
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Record a committed review
pub fn record_review(quality: Quality) {
    counter!("srs_reviews_total", "quality" => quality.label()).increment(1);
}

/// Record a built study session
pub fn record_session(size: usize) {
    counter!("srs_sessions_built_total").increment(1);
    histogram!("srs_session_size").record(size as f64);
}
