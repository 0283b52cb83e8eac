//! Admin dashboard handlers.
//!
//! Each view is computed from full snapshots of products, users and orders
//! and cached under its admin key until the next write touching any of them.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use storefront_core::analytics::{bar_charts, dashboard_stats, line_charts, pie_charts};
use storefront_core::{Order, Product, User};
use tracing::instrument;

use crate::cache::CacheKey;
use crate::error::AppError;
use crate::extractors::AdminUser;
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

type Compute<T> = fn(&[Product], &[User], &[Order], DateTime<Utc>) -> T;

async fn cached_view<T>(state: &AppState, key: CacheKey, compute: Compute<T>) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
{
    state
        .cache()
        .read_through(&key, || async {
            let products = state.products().all().await?;
            let users = state.users().all().await?;
            let orders = state.orders().all().await?;
            Ok::<_, AppError>(compute(&products, &users, &orders, Utc::now()))
        })
        .await
}

/// GET /dashboard/stats
#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let stats = cached_view(&state, CacheKey::AdminStats, dashboard_stats).await?;
    ApiResponse::ok().field("stats", &stats)
}

/// GET /dashboard/pie
#[instrument(skip_all)]
pub async fn pie(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let charts = cached_view(&state, CacheKey::PieCharts, pie_charts).await?;
    ApiResponse::ok().field("charts", &charts)
}

/// GET /dashboard/bar
#[instrument(skip_all)]
pub async fn bar(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let charts = cached_view(&state, CacheKey::BarCharts, bar_charts).await?;
    ApiResponse::ok().field("charts", &charts)
}

/// GET /dashboard/line
#[instrument(skip_all)]
pub async fn line(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let charts = cached_view(&state, CacheKey::LineCharts, line_charts).await?;
    ApiResponse::ok().field("charts", &charts)
}
