//! API error responses
//!
//! Every pipeline failure surfaces as 500 with `{"status":"error","message":..}`.
//! The `x-error-code` header carries the error kind for debugging.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::infra::AnchorError;

/// Error body returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status_code: StatusCode,
    #[serde(skip)]
    pub code: &'static str,
    pub status: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code,
            status: "error",
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized")
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }
}

impl From<AnchorError> for ApiError {
    fn from(err: AnchorError) -> Self {
        ApiError::internal(err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code;
        let code = self.code;
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            HeaderName::from_static("x-error-code"),
            HeaderValue::from_static(code),
        );
        response
    }
}
