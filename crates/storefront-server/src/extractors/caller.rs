//! Caller identity taken from the `x-user-id` header.

use axum::{
    extract::FromRequestParts,
    http::{HeaderName, request::Parts},
};
use storefront_core::User;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the id of the calling user.
pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Reads the caller id from the request headers, if any.
pub fn caller_id(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(&USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// A registered user making the request.
#[derive(Debug, Clone)]
pub struct Caller(pub User);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = caller_id(parts)
            .ok_or_else(|| AppError::Unauthorized("Please login first".to_string()))?;

        let user = state
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid user id".to_string()))?;

        Ok(Caller(user))
    }
}

/// A caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Caller(user) = Caller::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Only admins can access this resource".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}
