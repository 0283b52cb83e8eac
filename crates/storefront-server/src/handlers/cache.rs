//! Manual cache invalidation.

use axum::{Json, extract::State};
use tracing::{info, instrument};

use crate::cache::{InvalidationRequest, InvalidationResult};
use crate::error::AppError;
use crate::extractors::AdminUser;
use crate::state::AppState;

/// DELETE /cache
///
/// Drops the keys derived from the request body, exactly as a write would.
#[instrument(skip_all, fields(admin = %admin.id))]
pub async fn invalidate(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<InvalidationRequest>,
) -> Result<Json<InvalidationResult>, AppError> {
    if request.is_empty() {
        return Err(AppError::BadRequest(
            "Specify at least one tag to invalidate".to_string(),
        ));
    }

    let result = state.invalidator().invalidate(&request).await;
    info!(keys = result.keys.len(), removed = result.removed, "Manual invalidation");
    Ok(Json(result))
}
