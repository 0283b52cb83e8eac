//! HTTP metrics middleware.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use std::time::Instant;

use crate::server::API_PREFIX;

/// The storefront area a route template belongs to, e.g. `product` or `order`.
///
/// Routes outside the API prefix report as `system`.
pub fn route_area(route: &str) -> &str {
    match route.strip_prefix(API_PREFIX) {
        Some(rest) => rest
            .trim_start_matches('/')
            .split('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("system"),
        None => "system",
    }
}

/// Records request counts, latency and in-flight requests per route template.
pub async fn http_metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    // Templates like /api/v1/product/{id} keep label cardinality bounded
    let route = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let area = route_area(&route).to_string();

    gauge!("storefront_http_requests_in_flight", "area" => area.clone()).increment(1.0);
    let response = next.run(request).await;
    gauge!("storefront_http_requests_in_flight", "area" => area.clone()).decrement(1.0);

    let status = response.status();
    if status.is_server_error() {
        counter!("storefront_http_server_errors_total", "area" => area.clone()).increment(1);
    }

    counter!(
        "storefront_http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    histogram!(
        "storefront_http_request_duration_seconds",
        "method" => method,
        "route" => route,
        "area" => area
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Describes the HTTP metrics.
pub fn register_http_metrics() {
    metrics::describe_counter!(
        "storefront_http_requests_total",
        "Total number of HTTP requests by route template"
    );
    metrics::describe_counter!(
        "storefront_http_server_errors_total",
        "Requests answered with a 5xx status, by storefront area"
    );
    metrics::describe_gauge!(
        "storefront_http_requests_in_flight",
        "Requests currently being handled, by storefront area"
    );
    metrics::describe_histogram!(
        "storefront_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_area() {
        assert_eq!(route_area("/api/v1/product/{id}"), "product");
        assert_eq!(route_area("/api/v1/payment/coupon/new"), "payment");
        assert_eq!(route_area("/api/v1/cache"), "cache");
        assert_eq!(route_area("/health"), "system");
        assert_eq!(route_area("unmatched"), "system");
        assert_eq!(route_area("/api/v1"), "system");
    }
}
