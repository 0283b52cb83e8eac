//! User endpoint handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use storefront_core::{NewUser, StorefrontError, User};
use tracing::{info, instrument};

use crate::cache::InvalidationRequest;
use crate::error::AppError;
use crate::extractors::{AdminUser, IdPath};
use crate::handlers::response::ApiResponse;
use crate::state::AppState;

/// POST /user/new
///
/// Registering an id that already exists greets the stored user instead.
#[instrument(skip_all)]
pub async fn new_user(
    State(state): State<AppState>,
    Json(body): Json<NewUser>,
) -> Result<ApiResponse, AppError> {
    if let Some(id) = body.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
        && let Some(existing) = state.users().find_by_id(id).await?
    {
        return Ok(ApiResponse::ok().message(format!("Welcome back, {}", existing.name)));
    }

    let user = body.into_user(Utc::now())?;
    state.users().insert(&user).await?;

    state
        .invalidator()
        .invalidate(&InvalidationRequest::new().tag_admin())
        .await;

    info!(user = %user.id, "User registered");
    Ok(ApiResponse::created().message(format!("Welcome, {}", user.name)))
}

/// GET /user/all
#[instrument(skip_all)]
pub async fn all_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<ApiResponse, AppError> {
    let users: Vec<User> = state.users().all().await?;
    ApiResponse::ok().field("users", &users)
}

/// GET /user/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    let user = state
        .users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorefrontError::not_found("User", id))?;

    ApiResponse::ok().field("user", &user)
}

/// DELETE /user/{id}
#[instrument(skip_all, fields(id = %path.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(path): Path<IdPath>,
) -> Result<ApiResponse, AppError> {
    let id = path.validate()?;
    if !state.users().delete(id).await? {
        return Err(StorefrontError::not_found("User", id).into());
    }

    state
        .invalidator()
        .invalidate(&InvalidationRequest::new().tag_admin())
        .await;

    info!(user = %id, "User deleted");
    Ok(ApiResponse::ok().message("User deleted successfully"))
}
