use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Success envelope: `{"success": true, ...fields}`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiResponse {
    fn with_status(status: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        Self { status, body }
    }

    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body
            .insert("message".to_string(), Value::String(message.into()));
        self
    }

    /// Adds a serialized field to the envelope.
    pub fn field<T: Serialize>(mut self, name: &str, value: &T) -> Result<Self, AppError> {
        self.body
            .insert(name.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}
