//! Payment intents and coupons.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use storefront_core::{Coupon, CouponBody, StorefrontError};
use storefront_store::Filter;
use tracing::{info, instrument};

use crate::cache::{CacheKey, InvalidationRequest};
use crate::error::AppError;
use crate::extractors::{AdminUser, DiscountQuery, IdPath};
use crate::handlers::response::ApiResponse;
use crate::payments::to_minor_units;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PaymentBody {
    pub amount: Option<f64>,
}

async fn load_coupon(state: &AppState, id: &str) -> Result<Coupon, AppError> {
    state
        .coupons()
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("Coupon", id).into())
}

async fn find_by_code(state: &AppState, code: &str) -> Result<Option<Coupon>, AppError> {
    Ok(state
        .coupons()
        .find_one(&Filter::all().eq("code", code))
        .await?)
}

fn coupon_invalidation(id: &str) -> InvalidationRequest {
    InvalidationRequest::new().tag_coupon().for_coupon(id)
}

/// POST /payment/create
#[instrument(skip_all)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<PaymentBody>,
) -> Result<ApiResponse, AppError> {
    let amount = body
        .amount
        .ok_or_else(|| AppError::BadRequest("Please enter amount".to_string()))?;
    let amount = to_minor_units(amount)?;

    let client_secret = state
        .payments()
        .create_intent(amount, state.currency())
        .await?;

    info!(amount, gateway = state.payments().name(), "Payment intent created");
    ApiResponse::created().field("clientSecret", &client_secret)
}

/// POST /payment/coupon/new
#[instrument(skip_all)]
pub async fn new_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(body): Json<CouponBody>,
) -> Result<ApiResponse, AppError> {
    let coupon = body.into_coupon()?;
    if find_by_code(&state, &coupon.code).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "Coupon {} already exists",
            coupon.code
        )));
    }

    state.coupons().insert(&coupon).await?;

    info!(code = %coupon.code, "Coupon created");
    ApiResponse::created()
        .message(format!("Coupon {} created successfully", coupon.code))
        .field("coupon", &coupon)
}

/// GET /payment/coupon/all
#[instrument(skip_all)]
pub async fn all_coupons(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let coupons = state.coupons().all().await?;
    ApiResponse::ok().field("coupons", &coupons)
}

/// GET /payment/discount?code=
#[instrument(skip_all)]
pub async fn apply_discount(
    State(state): State<AppState>,
    Query(query): Query<DiscountQuery>,
) -> Result<ApiResponse, AppError> {
    let invalid = || AppError::BadRequest("Invalid coupon code".to_string());

    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(invalid)?;
    let coupon = find_by_code(&state, code).await?.ok_or_else(invalid)?;

    ApiResponse::ok()
        .message("Coupon applied")
        .field("discount", &coupon.amount)
}

/// GET /payment/coupon/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let coupon: Coupon = state
        .cache()
        .read_through(&CacheKey::coupon(id), || load_coupon(&state, id))
        .await?;

    ApiResponse::ok().field("coupon", &coupon)
}

/// PUT /payment/coupon/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn update_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
    Json(body): Json<CouponBody>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let mut coupon = load_coupon(&state, id).await?;

    body.apply(&mut coupon);
    if let Some(other) = find_by_code(&state, &coupon.code).await?
        && other.id != coupon.id
    {
        return Err(AppError::BadRequest(format!(
            "Coupon {} already exists",
            coupon.code
        )));
    }
    state.coupons().save(&coupon).await?;

    state.invalidator().invalidate(&coupon_invalidation(id)).await;

    info!(code = %coupon.code, "Coupon updated");
    ApiResponse::ok()
        .message(format!("Coupon {} updated successfully", coupon.code))
        .field("coupon", &coupon)
}

/// DELETE /payment/coupon/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn delete_coupon(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let coupon = load_coupon(&state, id).await?;

    state.coupons().delete(id).await?;
    state.invalidator().invalidate(&coupon_invalidation(id)).await;

    info!(code = %coupon.code, "Coupon deleted");
    Ok(ApiResponse::ok().message(format!("Coupon {} deleted successfully", coupon.code)))
}
