//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use super::{AuthError, BearerAuth};

/// Authentication middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub authenticator: Arc<BearerAuth>,
}

/// Reject requests without a valid bearer token before any processing
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.authenticator.authenticate(auth_header) {
        return auth_error_response(e);
    }

    next.run(request).await
}

fn auth_error_response(error: AuthError) -> Response {
    warn!(error = %error, "rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({
            "status": "error",
            "message": "Unauthorized"
        })),
    )
        .into_response()
}
