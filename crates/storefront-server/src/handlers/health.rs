use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache: CacheHealth,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub backend: String,
    pub status: String,
}

/// The server stays UP while the cache is down; reads fall through to the store.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let key_store = state.key_store();
    let cache_status = match key_store.ping().await {
        Ok(()) => "UP",
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            "DOWN"
        }
    };

    Json(HealthResponse {
        status: "UP".to_string(),
        cache: CacheHealth {
            backend: key_store.backend_name().to_string(),
            status: cache_status.to_string(),
        },
    })
}
