//! Prometheus scrape endpoint.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusHandle;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics
///
/// Cache hit and miss counters and the HTTP series share this one exposition.
pub async fn metrics_handler(State(prometheus): State<PrometheusHandle>) -> Response {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        prometheus.render(),
    )
        .into_response()
}
