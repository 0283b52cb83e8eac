use std::net::SocketAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{error, info};

use crate::handlers::{cache, dashboard, health, metrics, order, payment, product, review, user};
use crate::middleware::{LoggingLayer, RequestIdLayer};
use crate::settings::{Settings, UploadSettings};
use crate::state::AppState;

/// Mount point of the JSON API.
pub const API_PREFIX: &str = "/api/v1";

/// Body limit used when no settings are supplied.
const DEFAULT_BODY_LIMIT: usize = 20 * 1024 * 1024;

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/user/new", post(user::new_user))
        .route("/user/all", get(user::all_users))
        .route("/user/{id}", get(user::get_user).delete(user::delete_user))
        // Products
        .route("/product/new", post(product::new_product))
        .route("/product/latest", get(product::latest_products))
        .route("/product/categories", get(product::categories))
        .route("/product/admin/products", get(product::admin_products))
        .route("/product/all", get(product::search_products))
        .route(
            "/product/{id}",
            get(product::get_product)
                .put(product::update_product)
                .delete(product::delete_product),
        )
        // Reviews
        .route("/product/reviews/{id}", get(review::product_reviews))
        .route("/product/review/new/{id}", post(review::new_review))
        .route("/product/review/{id}", delete(review::delete_review))
        // Orders
        .route("/order/new", post(order::new_order))
        .route("/order/my", get(order::my_orders))
        .route("/order/all", get(order::all_orders))
        .route(
            "/order/{id}",
            get(order::get_order)
                .put(order::process_order)
                .delete(order::delete_order),
        )
        // Payments and coupons
        .route("/payment/create", post(payment::create_payment))
        .route("/payment/coupon/new", post(payment::new_coupon))
        .route("/payment/coupon/all", get(payment::all_coupons))
        .route("/payment/discount", get(payment::apply_discount))
        .route(
            "/payment/coupon/{id}",
            get(payment::get_coupon)
                .put(payment::update_coupon)
                .delete(payment::delete_coupon),
        )
        // Dashboard
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/pie", get(dashboard::pie))
        .route("/dashboard/bar", get(dashboard::bar))
        .route("/dashboard/line", get(dashboard::line))
        // Cache
        .route("/cache", delete(cache::invalidate))
}

fn build_router(
    state: AppState,
    prometheus_handle: PrometheusHandle,
    max_body_bytes: usize,
    uploads: Option<&UploadSettings>,
) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(prometheus_handle);

    let app_router = Router::new()
        .route("/health", get(health::health_check))
        .nest(API_PREFIX, api_routes())
        .with_state(state);

    let mut router = Router::new().merge(app_router).merge(metrics_router);

    if let Some(uploads) = uploads {
        let prefix = uploads.public_prefix.trim_end_matches('/');
        if prefix.starts_with('/') && prefix.len() > 1 {
            router = router.nest_service(prefix, ServeDir::new(&uploads.dir));
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(middleware_stack)
}

/// Creates the router with default limits and no static upload serving.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    build_router(state, prometheus_handle, DEFAULT_BODY_LIMIT, None)
}

/// Creates the router with the body limit and upload directory from `settings`.
pub fn create_router_with_settings(
    settings: &Settings,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Router {
    build_router(
        state,
        prometheus_handle,
        settings.uploads.max_body_bytes(),
        Some(&settings.uploads),
    )
}

/// Binds `addr` and serves until Ctrl+C or SIGTERM.
pub async fn run_server(
    addr: SocketAddr,
    settings: &Settings,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_settings(settings, state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
