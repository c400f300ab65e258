//! REST endpoints for anchoring panel events.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::crypto::to_hex_prefixed;
use crate::domain::{AnchorOutcome, DEFAULT_EVENT_TYPE};
use crate::server::AppState;

use super::error::ApiError;

/// Build the anchoring router. Authentication is layered on by the caller.
pub fn router() -> Router<AppState> {
    Router::new().route("/anchor", post(anchor_event))
}

/// Query parameters for `POST /anchor`
#[derive(Debug, Deserialize)]
pub struct AnchorParams {
    pub event_type: Option<String>,
}

/// Successful anchoring response
#[derive(Debug, Serialize)]
pub struct AnchorResponse {
    pub status: &'static str,
    pub panel_id: String,
    pub event_type: String,
    pub tx_hash: String,
    pub event_hash: String,
    pub block_number: Option<u64>,
}

impl From<AnchorOutcome> for AnchorResponse {
    fn from(outcome: AnchorOutcome) -> Self {
        Self {
            status: "success",
            panel_id: outcome.asset_id.into(),
            event_type: outcome.event_type.into(),
            tx_hash: to_hex_prefixed(&outcome.transaction_hash),
            event_hash: to_hex_prefixed(&outcome.event_digest),
            block_number: outcome.block_number,
        }
    }
}

async fn anchor_event(
    State(state): State<AppState>,
    Query(params): Query<AnchorParams>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<AnchorResponse>, ApiError> {
    let Json(record) =
        body.map_err(|e| ApiError::internal("malformed_record", e.body_text()))?;
    let event_type = params
        .event_type
        .as_deref()
        .unwrap_or(DEFAULT_EVENT_TYPE);

    let outcome = state.pipeline.process(&record, event_type).await?;
    Ok(Json(outcome.into()))
}
