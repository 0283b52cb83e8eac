use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use storefront_core::StorefrontError;
use storefront_store::StoreError;
use tracing::error;

use crate::payments::PaymentError;

#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid input
    BadRequest(String),

    /// No caller identity, or an unknown one
    Unauthorized(String),

    /// Caller known but not allowed
    Forbidden(String),

    /// Entity not found
    NotFound(String),

    /// Store, gateway or serialization failure
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            AppError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<StorefrontError> for AppError {
    fn from(e: StorefrontError) -> Self {
        match e {
            StorefrontError::NotFound { entity, .. } => {
                AppError::NotFound(format!("{entity} not found"))
            }
            StorefrontError::Validation { message, .. } => AppError::BadRequest(message),
            StorefrontError::Unauthorized(msg) => AppError::Unauthorized(msg),
            StorefrontError::Forbidden(msg) => AppError::Forbidden(msg),
            StorefrontError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { collection, .. } => {
                AppError::BadRequest(format!("Duplicate entry in {collection}"))
            }
            StoreError::Missing { collection, id } => {
                AppError::NotFound(format!("No {id} in {collection}"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::InvalidAmount => AppError::BadRequest(e.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}
